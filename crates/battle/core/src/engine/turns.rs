//! Round structure: reaction roll, quick, slow and enemy activations.
//!
//! These helpers are the only code that moves the phase machine. Effect
//! housekeeping happens in exactly one place, [`begin_round`].

use tracing::{debug, info, warn};

use crate::state::{
    BattlePhase, BattleState, LogEntry, MissionStatus, ParticipantId, ParticipantStatus,
};
use crate::stats::{StatContext, calculate_effective_stats};

/// Builds the activation orders from the recorded rolls and enters the quick
/// phase.
pub(crate) fn start_activations(state: &mut BattleState) {
    let mut quick = Vec::new();
    let mut slow = Vec::new();
    let mut enemies = Vec::new();

    for participant in state.participants.iter().filter(|p| !p.is_casualty()) {
        if state.rolling_side(participant).is_none() {
            enemies.push(participant.id.clone());
            continue;
        }
        let reactions = calculate_effective_stats(participant, StatContext::ReactionRoll).reactions;
        let entry = (participant.id.clone(), reactions);
        match state.reaction_rolls.get(&participant.id) {
            Some(roll) if roll.success => quick.push(entry),
            _ => slow.push(entry),
        }
    }

    // Stable sorts keep list order among equal reactions.
    quick.sort_by(|a, b| b.1.cmp(&a.1));
    slow.sort_by(|a, b| b.1.cmp(&a.1));

    state.quick_action_order = quick.into_iter().map(|(id, _)| id).collect();
    state.slow_action_order = slow.into_iter().map(|(id, _)| id).collect();
    state.enemy_turn_order = enemies;
    enter_phase(state, BattlePhase::QuickActions);
}

/// Ends the active participant's turn and activates the next one.
pub(crate) fn end_turn(state: &mut BattleState) {
    if let Some(id) = state.active_participant_id.take() {
        state.push_log(LogEntry::new("turn_ended").source(&id));
    }
    state.follow_up_state = None;
    state.order_cursor += 1;
    activate_next(state);
}

/// Ends the turn of an active participant with nothing left to do.
pub(crate) fn settle(state: &mut BattleState) {
    let Some(active) = state.active_participant() else {
        return;
    };
    let follow_up_pending = state
        .follow_up_state
        .as_ref()
        .is_some_and(|f| f.participant_id == active.id);
    if active.is_casualty() || (active.actions_remaining == 0 && !follow_up_pending) {
        end_turn(state);
    }
}

pub(crate) fn end_battle(state: &mut BattleState, status: MissionStatus) {
    info!(round = state.round, status = %status, "battle over");
    state.phase = BattlePhase::BattleOver(status);
    state.active_participant_id = None;
    state.follow_up_state = None;
    state.push_log(LogEntry::new("battle_over").param("status", status.as_ref()));
}

fn enter_phase(state: &mut BattleState, phase: BattlePhase) {
    debug!(from = state.phase.as_str(), to = phase.as_str(), "phase transition");
    state.phase = phase;
    state.order_cursor = 0;
    state.active_participant_id = None;
    state.push_log(LogEntry::new("phase_changed").param("phase", phase.as_str()));
    activate_next(state);
}

fn eligible(state: &BattleState, id: &ParticipantId) -> bool {
    match state.participant(id) {
        Some(p) if p.is_casualty() => {
            warn!(participant = %id, "skipping casualty in turn order");
            false
        }
        Some(p) => p.actions_remaining > 0,
        None => {
            warn!(participant = %id, "unknown participant in turn order");
            false
        }
    }
}

/// Activates the next eligible participant, moving through phases as the
/// orders run out.
fn activate_next(state: &mut BattleState) {
    if !state.phase.is_activation() {
        return;
    }

    let next = state
        .current_order()
        .iter()
        .enumerate()
        .skip(state.order_cursor)
        .find(|(_, id)| eligible(state, id))
        .map(|(index, id)| (index, id.clone()));

    match next {
        Some((index, id)) => {
            state.order_cursor = index;
            state.push_log(LogEntry::new("turn_started").source(&id));
            state.active_participant_id = Some(id);
        }
        None => match state.phase {
            BattlePhase::QuickActions => enter_phase(state, BattlePhase::SlowActions),
            BattlePhase::SlowActions => enter_phase(state, BattlePhase::EnemyActions),
            _ => begin_round(state),
        },
    }
}

/// Starts the next round: per-round effect housekeeping, action reset and the
/// reaction roll.
pub(crate) fn begin_round(state: &mut BattleState) {
    state.round += 1;
    let mut entries = Vec::new();

    for participant in state.participants.iter_mut().filter(|p| !p.is_casualty()) {
        for expired in participant.active_effects.tick_round() {
            entries.push(
                LogEntry::new("effect_expired")
                    .source(&participant.id)
                    .param("effect", expired.source_name),
            );
        }

        if participant.stun_tokens > 0 {
            participant.stun_tokens -= 1;
        }
        let recovered = match participant.status {
            ParticipantStatus::Stunned => participant.stun_tokens == 0,
            ParticipantStatus::Dazed => true,
            ParticipantStatus::Active | ParticipantStatus::Casualty => false,
        };
        if recovered {
            participant.status = ParticipantStatus::Active;
            entries.push(LogEntry::new("status_cleared").source(&participant.id));
        }

        participant.reset_actions();
    }

    state.phase = BattlePhase::ReactionRoll;
    state.active_participant_id = None;
    state.follow_up_state = None;
    state.order_cursor = 0;
    state.reaction_rolls.clear();
    state.quick_action_order.clear();
    state.slow_action_order.clear();
    state.enemy_turn_order.clear();

    debug!(round = state.round, "round started");
    state.push_log(LogEntry::new("round_started").param("round", state.round));
    for entry in entries {
        state.push_log(entry);
    }
}
