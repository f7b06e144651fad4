//! Friend/foe classification and derived rule queries.
//!
//! These helpers are pure reads over [`BattleState`]; the action validators,
//! the enemy AI and presentation code all go through them.

use crate::action::{ActionKind, validation};
use crate::config::BattleConfig;
use crate::env::{ArmoryOracle, BattleEnv, WeaponDefinition, resolve_weapon};
use crate::geometry::{ReachableCells, find_reachable_cells, line_path};
use crate::state::{
    BattlePhase, BattleState, MultiplayerRole, Participant, ParticipantId, ParticipantType,
    Position, WorldTrait,
};
use crate::stats::{StatContext, calculate_effective_stats};
use crate::visibility::has_line_of_sight;

/// Single source of truth for friend/foe.
///
/// With a multiplayer role the `host`/`guest` id prefixes decide; otherwise
/// characters and enemies oppose each other.
pub fn is_opponent(
    participant: &Participant,
    other: &Participant,
    multiplayer_role: Option<MultiplayerRole>,
) -> bool {
    if participant.id == other.id {
        return false;
    }
    match multiplayer_role {
        Some(_) => match (participant.id.side(), other.id.side()) {
            (Some(a), Some(b)) => a != b,
            _ => participant.participant_type() != other.participant_type(),
        },
        None => participant.participant_type() != other.participant_type(),
    }
}

/// Whether `participant` fights for the local player.
pub fn is_player_side(state: &BattleState, participant: &Participant) -> bool {
    match state.multiplayer_role {
        Some(role) => participant.id.side() == Some(role.side()),
        None => participant.participant_type() == ParticipantType::Character,
    }
}

/// Living opponents of `participant`.
pub fn opponents<'s>(
    state: &'s BattleState,
    participant: &'s Participant,
) -> impl Iterator<Item = &'s Participant> + 's {
    state
        .participants
        .iter()
        .filter(move |other| !other.is_casualty())
        .filter(move |other| is_opponent(participant, other, state.multiplayer_role))
}

/// True if a living opponent stands within one cell.
pub fn is_engaged(state: &BattleState, participant: &Participant) -> bool {
    opponents(state, participant).any(|other| other.position.distance(participant.position) <= 1)
}

/// Base weapon merged with the instance's attachments.
///
/// `None` if the instance is not carried, is inoperable, or names unknown
/// reference data.
pub fn get_effective_weapon(
    participant: &Participant,
    instance_id: &str,
    armory: &dyn ArmoryOracle,
) -> Option<WeaponDefinition> {
    if participant.inoperable_weapons.contains(instance_id) {
        return None;
    }
    let instance = participant.weapon(instance_id)?;
    resolve_weapon(
        armory,
        &instance.weapon_id,
        instance.mod_id.as_deref(),
        instance.sight_id.as_deref(),
    )
}

/// Opponents in range of `weapon` and in sight of `shooter`.
pub fn get_valid_shoot_targets<'s>(
    state: &'s BattleState,
    shooter: &'s Participant,
    weapon: &WeaponDefinition,
) -> Vec<&'s Participant> {
    let Some(range) = weapon.range.cells() else {
        return Vec::new();
    };
    let geometry = state.geometry();
    opponents(state, shooter)
        .filter(|target| shooter.position.distance(target.position) <= range)
        .filter(|target| has_line_of_sight(shooter.position, target.position, &geometry))
        .collect()
}

/// Cells a move (or dash) may end on.
///
/// A terrified participant only ever gets its flee destination.
pub fn movement_options(
    state: &BattleState,
    participant: &Participant,
    dash: bool,
    config: &BattleConfig,
) -> ReachableCells {
    let geometry = state.geometry();
    if let Some(source) = participant.active_effects.terrified_by() {
        return flee_destination(state, participant, source, config)
            .into_iter()
            .collect();
    }

    let speed = calculate_effective_stats(participant, StatContext::General).speed.max(0) as u32;
    let budget = if dash { speed * 2 } else { speed };
    find_reachable_cells(participant.position, budget, &geometry, Some(&participant.id))
}

/// Reachable cell within the flee distance furthest from `source`.
///
/// Ties go to the lowest `(y, x)`. Returns the cell and its step cost.
pub fn flee_destination(
    state: &BattleState,
    participant: &Participant,
    source: Position,
    config: &BattleConfig,
) -> Option<(Position, u32)> {
    let geometry = state.geometry();
    find_reachable_cells(
        participant.position,
        config.flee_distance,
        &geometry,
        Some(&participant.id),
    )
    .into_iter()
    .min_by_key(|(cell, _)| (std::cmp::Reverse(cell.distance(source)), cell.y, cell.x))
}

/// Walkable cells a teleport could land on with the best possible roll.
pub fn teleport_cells(
    state: &BattleState,
    participant: &Participant,
    config: &BattleConfig,
) -> Vec<Position> {
    let geometry = state.geometry();
    let reach = config.teleport_die as i32;
    let origin = participant.position;
    let mut cells = Vec::new();
    for y in (origin.y - reach)..=(origin.y + reach) {
        for x in (origin.x - reach)..=(origin.x + reach) {
            let cell = Position::new(x, y);
            if cell != origin && geometry.is_cell_walkable(cell, Some(&participant.id)) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Cells a slide could end on with the best possible roll.
///
/// Every cell of the line from the participant must be walkable.
pub fn slide_cells(
    state: &BattleState,
    participant: &Participant,
    config: &BattleConfig,
) -> Vec<Position> {
    let geometry = state.geometry();
    let reach = config.slide_die as i32;
    let origin = participant.position;
    let mut cells = Vec::new();
    for y in (origin.y - reach)..=(origin.y + reach) {
        for x in (origin.x - reach)..=(origin.x + reach) {
            let cell = Position::new(x, y);
            if cell == origin {
                continue;
            }
            let clear = line_path(origin, cell)
                .into_iter()
                .skip(1)
                .all(|step| geometry.is_cell_walkable(step, Some(&participant.id)));
            if clear {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Action kinds `id` may request right now.
///
/// Mirrors the validators, so everything offered here passes the generic
/// checks; target-specific legality is still checked on resolution.
pub fn available_actions(
    state: &BattleState,
    env: &BattleEnv<'_>,
    id: &ParticipantId,
) -> Vec<ActionKind> {
    let mut kinds = Vec::new();
    let Some(participant) = state.participant(id) else {
        return kinds;
    };
    if participant.is_casualty() {
        return kinds;
    }

    if state.phase == BattlePhase::ReactionRoll {
        if state.rolling_side(participant).is_some() && !state.reaction_rolls.contains_key(id) {
            kinds.push(ActionKind::RollInitiative);
        }
        return kinds;
    }

    if state
        .follow_up_state
        .as_ref()
        .is_some_and(|f| &f.participant_id == id)
    {
        kinds.push(ActionKind::FollowUpMove);
        kinds.push(ActionKind::SkipFollowUp);
        return kinds;
    }

    if validation::active_actor(state, id).is_err() {
        return kinds;
    }
    let config = env.config();

    if validation::ensure_can_move(participant, ActionKind::Move).is_ok() {
        if !movement_options(state, participant, false, config).is_empty() {
            kinds.push(ActionKind::Move);
        }
        if participant.active_effects.terrified_by().is_none() {
            kinds.push(ActionKind::Dash);
            if state.has_trait(WorldTrait::Frozen)
                && !slide_cells(state, participant, config).is_empty()
            {
                kinds.push(ActionKind::Slide);
            }
            if validation::ensure_teleport_allowed(state, participant).is_ok()
                && !teleport_cells(state, participant, config).is_empty()
            {
                kinds.push(ActionKind::Teleport);
            }
        }
    }

    if let Ok(armory) = env.armory() {
        let has_targets = participant.weapons.iter().any(|instance| {
            get_effective_weapon(participant, &instance.instance_id, armory)
                .filter(WeaponDefinition::can_shoot)
                .is_some_and(|weapon| {
                    !get_valid_shoot_targets(state, participant, &weapon).is_empty()
                })
        });
        if has_targets {
            let snap = validation::ensure_shot_allowed(state, participant, ActionKind::SnapShot, 1);
            if snap.is_ok() {
                kinds.push(ActionKind::SnapShot);
            }
            let aimed_cost = validation::aimed_cost(participant);
            let aimed = validation::ensure_shot_allowed(
                state,
                participant,
                ActionKind::AimedShot,
                aimed_cost,
            );
            if aimed.is_ok() && !participant.actions_taken.has_moved()
            {
                kinds.push(ActionKind::AimedShot);
            }
            if validation::ensure_actions(participant, 1).is_ok()
                && validation::ensure_combat(state, participant, ActionKind::PanicFire).is_ok()
            {
                kinds.push(ActionKind::PanicFire);
            }
        }
    }

    if is_engaged(state, participant)
        && validation::ensure_actions(participant, 1).is_ok()
        && validation::ensure_combat(state, participant, ActionKind::Brawl).is_ok()
    {
        kinds.push(ActionKind::Brawl);
    }

    let objective_near = state
        .mission
        .objectives
        .iter()
        .any(|o| !o.is_complete() && o.position.distance(participant.position) <= 1);
    if objective_near
        && validation::ensure_actions(participant, 1).is_ok()
        && validation::ensure_combat(state, participant, ActionKind::Interact).is_ok()
    {
        kinds.push(ActionKind::Interact);
    }

    let usable_consumable = participant
        .consumables
        .iter()
        .any(|c| validation::ensure_consumable_allowed(participant, c, env).is_ok());
    if usable_consumable {
        kinds.push(ActionKind::UseConsumable);
    }

    kinds.push(ActionKind::EndTurn);
    kinds
}
