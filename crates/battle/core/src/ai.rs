//! Default enemy decision procedure.
//!
//! The engine treats enemy behavior as a black box implementing
//! [`EnemyDecider`]: given the state and the active enemy it returns one
//! [`ActionRequest`], exactly like a player would. [`ClosestTargetAi`] is the
//! built-in decider:
//!
//! 1. Resolve a pending follow-up by skipping it.
//! 2. Brawl when engaged and forced to (`MustBrawl`).
//! 3. Snap-shoot the closest valid target with the first weapon that has one.
//! 4. Brawl the closest adjacent opponent.
//! 5. Step toward the nearest opponent.
//! 6. End the turn.

use crate::action::{ActionKind, ActionRequest, ShotMode, validation};
use crate::env::{BattleEnv, WeaponDefinition};
use crate::rules;
use crate::state::{BattleState, Participant, ParticipantId, Position, SpecialAbility};

/// Chooses the next request for an enemy.
pub trait EnemyDecider: Send + Sync {
    fn decide(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
        enemy: &ParticipantId,
    ) -> ActionRequest;
}

/// Aggressive decider that always goes for the nearest opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosestTargetAi;

impl EnemyDecider for ClosestTargetAi {
    fn decide(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
        enemy: &ParticipantId,
    ) -> ActionRequest {
        if state
            .follow_up_state
            .as_ref()
            .is_some_and(|f| &f.participant_id == enemy)
        {
            return ActionRequest::skip_follow_up(enemy.clone());
        }
        let Some(actor) = state.participant(enemy) else {
            return ActionRequest::end_turn(enemy.clone());
        };

        let engaged = rules::is_engaged(state, actor);
        if engaged && actor.has_ability(SpecialAbility::MustBrawl) {
            if let Some(request) = brawl_request(state, env, actor) {
                return request;
            }
        }
        if let Some(request) = shoot_request(state, env, actor) {
            return request;
        }
        if engaged {
            if let Some(request) = brawl_request(state, env, actor) {
                return request;
            }
        }
        if let Some(request) = approach_request(state, env, actor) {
            return request;
        }
        ActionRequest::end_turn(enemy.clone())
    }
}

fn closest<'s>(
    actor: &Participant,
    candidates: impl IntoIterator<Item = &'s Participant>,
) -> Option<&'s Participant> {
    candidates
        .into_iter()
        .min_by(|a, b| {
            actor
                .position
                .distance(a.position)
                .cmp(&actor.position.distance(b.position))
                .then_with(|| a.id.cmp(&b.id))
        })
}

fn shoot_request(
    state: &BattleState,
    env: &BattleEnv<'_>,
    actor: &Participant,
) -> Option<ActionRequest> {
    validation::ensure_shot_allowed(state, actor, ActionKind::SnapShot, 1).ok()?;
    let armory = env.armory().ok()?;

    actor.weapons.iter().find_map(|instance| {
        let weapon = rules::get_effective_weapon(actor, &instance.instance_id, armory)
            .filter(WeaponDefinition::can_shoot)?;
        let target = closest(actor, rules::get_valid_shoot_targets(state, actor, &weapon))?;
        Some(ActionRequest::shoot(
            actor.id.clone(),
            target.id.clone(),
            instance.instance_id.clone(),
            ShotMode::Snap,
        ))
    })
}

fn brawl_request(
    state: &BattleState,
    env: &BattleEnv<'_>,
    actor: &Participant,
) -> Option<ActionRequest> {
    validation::ensure_actions(actor, 1).ok()?;
    validation::ensure_combat(state, actor, ActionKind::Brawl).ok()?;

    let adjacent = rules::opponents(state, actor)
        .filter(|other| other.position.distance(actor.position) <= 1);
    let target = closest(actor, adjacent)?;

    let weapon = env.armory().ok().and_then(|armory| {
        actor
            .weapons
            .iter()
            .filter_map(|instance| {
                rules::get_effective_weapon(actor, &instance.instance_id, armory)
                    .map(|weapon| (instance.instance_id.clone(), weapon.brawl_bonus()))
            })
            .max_by_key(|(_, bonus)| *bonus)
            .map(|(instance_id, _)| instance_id)
    });
    Some(ActionRequest::brawl(actor.id.clone(), target.id.clone(), weapon))
}

fn approach_request(
    state: &BattleState,
    env: &BattleEnv<'_>,
    actor: &Participant,
) -> Option<ActionRequest> {
    validation::ensure_actions(actor, 1).ok()?;
    validation::ensure_can_move(actor, ActionKind::Move).ok()?;

    let options = rules::movement_options(state, actor, false, env.config());
    if actor.active_effects.terrified_by().is_some() {
        // Terror leaves exactly one legal destination.
        let (&cell, _) = options.iter().next()?;
        return Some(ActionRequest::move_to(actor.id.clone(), cell));
    }

    let target = closest(actor, rules::opponents(state, actor))?;
    let current = actor.position.distance(target.position);
    let best: Option<Position> = options
        .keys()
        .copied()
        .min_by_key(|cell| (cell.distance(target.position), cell.y, cell.x));
    best.filter(|cell| cell.distance(target.position) < current)
        .map(|cell| ActionRequest::move_to(actor.id.clone(), cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ArmorySnapshot, WeaponRange, WeaponTraits};
    use crate::state::{BattlePhase, GridSize, Participant, WeaponInstance};
    use crate::stats::Stats;

    fn stats() -> Stats {
        Stats::new(1, 4, 1, 4, 0, 0)
    }

    fn armory() -> ArmorySnapshot {
        ArmorySnapshot::new()
            .with_weapon(WeaponDefinition::new("rifle", WeaponRange::Cells(12), 1, 1))
            .with_weapon(
                WeaponDefinition::new("blade", WeaponRange::Brawl, 0, 1)
                    .with_traits(WeaponTraits::MELEE),
            )
    }

    fn enemy_turn(participants: Vec<Participant>) -> BattleState {
        let mut state = BattleState::new(GridSize::new(12, 12));
        state.participants = participants;
        state.phase = BattlePhase::EnemyActions;
        state.active_participant_id = Some(ParticipantId::new("e1"));
        state.enemy_turn_order = vec![ParticipantId::new("e1")];
        state
    }

    #[test]
    fn shoots_the_closest_visible_opponent() {
        let state = enemy_turn(vec![
            Participant::character("c1", "Ada", Position::new(8, 0), stats()),
            Participant::character("c2", "Bo", Position::new(3, 0), stats()),
            Participant::enemy("e1", "Raider", "aggressive", Position::new(0, 0), stats())
                .with_weapon(WeaponInstance::new("w1", "rifle")),
        ]);
        let armory = armory();
        let env = BattleEnv::empty().with_armory(&armory);

        let request = ClosestTargetAi.decide(&state, &env, &ParticipantId::new("e1"));
        assert_eq!(
            request,
            ActionRequest::shoot("e1", "c2", "w1", ShotMode::Snap)
        );
    }

    #[test]
    fn must_brawl_prefers_the_adjacent_opponent() {
        let state = enemy_turn(vec![
            Participant::character("c1", "Ada", Position::new(1, 0), stats()),
            Participant::enemy("e1", "Krag", "aggressive", Position::new(0, 0), stats())
                .with_ability(SpecialAbility::MustBrawl)
                .with_weapon(WeaponInstance::new("w1", "rifle"))
                .with_weapon(WeaponInstance::new("w2", "blade")),
        ]);
        let armory = armory();
        let env = BattleEnv::empty().with_armory(&armory);

        let request = ClosestTargetAi.decide(&state, &env, &ParticipantId::new("e1"));
        assert_eq!(
            request,
            ActionRequest::brawl("e1", "c1", Some("w2".to_owned()))
        );
    }

    #[test]
    fn unarmed_enemy_moves_toward_the_nearest_opponent() {
        let state = enemy_turn(vec![
            Participant::character("c1", "Ada", Position::new(10, 0), stats()),
            Participant::enemy("e1", "Raider", "aggressive", Position::new(0, 0), stats()),
        ]);
        let env = BattleEnv::empty();

        let request = ClosestTargetAi.decide(&state, &env, &ParticipantId::new("e1"));
        assert_eq!(request, ActionRequest::move_to("e1", Position::new(4, 0)));
    }

    #[test]
    fn ends_turn_when_nothing_is_left() {
        let mut state = enemy_turn(vec![
            Participant::character("c1", "Ada", Position::new(10, 0), stats()),
            Participant::enemy("e1", "Raider", "aggressive", Position::new(0, 0), stats()),
        ]);
        state.participants[1].actions_remaining = 0;

        let request =
            ClosestTargetAi.decide(&state, &BattleEnv::empty(), &ParticipantId::new("e1"));
        assert_eq!(request, ActionRequest::end_turn("e1"));
    }
}
