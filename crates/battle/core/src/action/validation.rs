//! Checks shared by every action validator.
//!
//! The order mirrors how a request is judged: phase and activation first,
//! then the action economy, then per-turn exhaustion. Geometry and targeting
//! are left to the individual actions.

use super::{ActionError, ActionKind};
use crate::config::BattleConfig;
use crate::env::BattleEnv;
use crate::rules;
use crate::state::{
    ActionsTaken, BattleState, Participant, ParticipantId, SpecialAbility, WorldTrait,
};

/// Resolves `actor` as the participant currently holding the turn.
pub fn active_actor<'s>(
    state: &'s BattleState,
    actor: &ParticipantId,
) -> Result<&'s Participant, ActionError> {
    let participant = state
        .participant(actor)
        .ok_or_else(|| ActionError::ParticipantNotFound(actor.clone()))?;

    if !state.phase.is_activation() {
        return Err(ActionError::PhaseMismatch { phase: state.phase });
    }
    if state.active_participant_id.as_ref() != Some(actor) || participant.is_casualty() {
        return Err(ActionError::NotActiveParticipant(actor.clone()));
    }
    if state
        .follow_up_state
        .as_ref()
        .is_some_and(|f| &f.participant_id == actor)
    {
        return Err(ActionError::FollowUpPending(actor.clone()));
    }

    Ok(participant)
}

pub fn ensure_actions(participant: &Participant, required: u8) -> Result<(), ActionError> {
    if participant.actions_remaining < required {
        return Err(ActionError::InsufficientActions {
            required,
            remaining: participant.actions_remaining,
        });
    }
    Ok(())
}

/// Move-type actions: one per turn.
pub fn ensure_can_move(participant: &Participant, kind: ActionKind) -> Result<(), ActionError> {
    ensure_actions(participant, 1)?;
    if participant.actions_taken.has_moved() {
        return Err(ActionError::AlreadyActed(kind));
    }
    Ok(())
}

/// Combat-type actions: one per turn, two with [`SpecialAbility::DoubleAction`].
///
/// An engaged [`SpecialAbility::MustBrawl`] participant may only brawl.
pub fn ensure_combat(
    state: &BattleState,
    participant: &Participant,
    kind: ActionKind,
) -> Result<(), ActionError> {
    if participant.actions_taken.contains(ActionsTaken::COMBAT) {
        let second_allowed = participant.has_ability(SpecialAbility::DoubleAction)
            && participant.combat_actions_taken < BattleConfig::MAX_COMBAT_ACTIONS_DOUBLE;
        if !second_allowed {
            return Err(ActionError::AlreadyActed(kind));
        }
    }

    if kind != ActionKind::Brawl
        && participant.has_ability(SpecialAbility::MustBrawl)
        && rules::is_engaged(state, participant)
    {
        return Err(ActionError::MustBrawl);
    }

    Ok(())
}

pub fn aimed_cost(participant: &Participant) -> u8 {
    if participant.has_ability(SpecialAbility::DoubleAction) {
        1
    } else {
        2
    }
}

/// Snap and aimed shots.
pub fn ensure_shot_allowed(
    state: &BattleState,
    participant: &Participant,
    kind: ActionKind,
    cost: u8,
) -> Result<(), ActionError> {
    ensure_actions(participant, cost)?;
    if kind == ActionKind::AimedShot && participant.actions_taken.has_moved() {
        return Err(ActionError::AlreadyActed(ActionKind::Move));
    }
    ensure_combat(state, participant, kind)?;
    if participant.active_effects.is_suppressed() {
        return Err(ActionError::Suppressed);
    }
    Ok(())
}

pub fn ensure_teleport_allowed(
    state: &BattleState,
    participant: &Participant,
) -> Result<(), ActionError> {
    if !participant.has_ability(SpecialAbility::Teleporter) {
        return Err(ActionError::AbilityUnavailable(SpecialAbility::Teleporter));
    }
    if state.has_trait(WorldTrait::NullZone) {
        return Err(ActionError::WorldTraitForbids(WorldTrait::NullZone));
    }
    Ok(())
}

/// Slides, teleports and dashes are closed to terrified participants.
pub fn ensure_not_terrified(participant: &Participant) -> Result<(), ActionError> {
    if participant.active_effects.terrified_by().is_some() {
        return Err(ActionError::Terrified);
    }
    Ok(())
}

/// Action cost of the next consumable use.
///
/// The first use is free until the participant moves or fights.
pub fn consumable_cost(participant: &Participant) -> u8 {
    let acted = participant
        .actions_taken
        .intersects(ActionsTaken::MOVE | ActionsTaken::DASH | ActionsTaken::COMBAT);
    if participant.consumables_used_this_turn == 0 && !acted {
        0
    } else {
        1
    }
}

/// Checks a consumable use and returns its action cost.
pub fn ensure_consumable_allowed(
    participant: &Participant,
    consumable_id: &str,
    env: &BattleEnv<'_>,
) -> Result<u8, ActionError> {
    if participant.has_ability(SpecialAbility::Bot) {
        return Err(ActionError::ConsumablesForbidden);
    }
    if participant.consumables_used_this_turn >= BattleConfig::MAX_CONSUMABLE_USES {
        return Err(ActionError::ConsumableLimit);
    }
    let carried = participant.consumables.iter().any(|c| c == consumable_id);
    if !carried || env.armory()?.consumable(consumable_id).is_none() {
        return Err(ActionError::ConsumableUnavailable(consumable_id.to_owned()));
    }
    let cost = consumable_cost(participant);
    ensure_actions(participant, cost)?;
    Ok(cost)
}

/// Books a move-type action.
pub fn spend_move(participant: &mut Participant, dash: bool) {
    participant.spend_actions(1);
    participant.actions_taken |= ActionsTaken::MOVE;
    if dash {
        participant.actions_taken |= ActionsTaken::DASH;
    }
}

/// Books a combat-type action.
pub fn spend_combat(participant: &mut Participant, cost: u8) {
    participant.spend_actions(cost);
    participant.actions_taken |= ActionsTaken::COMBAT;
    participant.combat_actions_taken = participant.combat_actions_taken.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GridSize, Position};
    use crate::stats::Stats;

    fn fighter(id: &str, x: i32) -> Participant {
        Participant::character(id, id, Position::new(x, 0), Stats::new(1, 4, 1, 4, 0, 0))
    }

    #[test]
    fn second_combat_action_needs_double_action() {
        let state = BattleState::new(GridSize::new(6, 6));
        let mut p = fighter("c1", 0);
        spend_combat(&mut p, 1);
        assert_eq!(
            ensure_combat(&state, &p, ActionKind::SnapShot),
            Err(ActionError::AlreadyActed(ActionKind::SnapShot))
        );

        p.special_abilities.insert(SpecialAbility::DoubleAction);
        assert!(ensure_combat(&state, &p, ActionKind::SnapShot).is_ok());
        spend_combat(&mut p, 1);
        assert!(ensure_combat(&state, &p, ActionKind::SnapShot).is_err());
    }

    #[test]
    fn must_brawl_blocks_other_combat_while_engaged() {
        let mut state = BattleState::new(GridSize::new(6, 6));
        let brute = fighter("c1", 0).with_ability(SpecialAbility::MustBrawl);
        let foe =
            Participant::enemy("e1", "Raider", "aggressive", Position::new(1, 0), Stats::default());
        state.participants = vec![brute.clone(), foe];

        assert_eq!(
            ensure_combat(&state, &brute, ActionKind::SnapShot),
            Err(ActionError::MustBrawl)
        );
        assert!(ensure_combat(&state, &brute, ActionKind::Brawl).is_ok());
    }

    #[test]
    fn aimed_shot_after_moving_is_rejected_even_with_actions_left() {
        let state = BattleState::new(GridSize::new(6, 6));
        let mut p = fighter("c1", 0).with_ability(SpecialAbility::DoubleAction);
        spend_move(&mut p, false);
        assert_eq!(p.actions_remaining, 1);
        assert_eq!(
            ensure_shot_allowed(&state, &p, ActionKind::AimedShot, aimed_cost(&p)),
            Err(ActionError::AlreadyActed(ActionKind::Move))
        );
    }

    #[test]
    fn first_consumable_is_free_only_before_acting() {
        let mut p = fighter("c1", 0);
        assert_eq!(consumable_cost(&p), 0);
        p.consumables_used_this_turn = 1;
        assert_eq!(consumable_cost(&p), 1);

        let mut q = fighter("c2", 1);
        spend_move(&mut q, false);
        assert_eq!(consumable_cost(&q), 1);
    }
}
