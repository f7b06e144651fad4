//! Reaction-roll phase requests.

use tracing::debug;

use super::{ActionError, ActionKind, ActionTransition, dice_for};
use crate::engine::turns;
use crate::env::BattleEnv;
use crate::state::{
    BattlePhase, BattleState, LogEntry, Participant, ParticipantId, ReactionRoll, RollingSide,
    SpecialAbility,
};
use crate::stats::{StatContext, calculate_effective_stats};

fn ensure_reaction_phase(state: &BattleState) -> Result<(), ActionError> {
    if state.phase != BattlePhase::ReactionRoll {
        return Err(ActionError::PhaseMismatch { phase: state.phase });
    }
    Ok(())
}

/// Living participants rolling for `side`.
fn side_members(state: &BattleState, side: RollingSide) -> impl Iterator<Item = &Participant> {
    state
        .participants
        .iter()
        .filter(move |p| !p.is_casualty() && state.rolling_side(p) == Some(side))
}

/// Next living roller that still owes a die.
///
/// Host rollers come before guest rollers; within a side, participant order.
pub fn first_missing_roll(state: &BattleState) -> Option<&ParticipantId> {
    state
        .participants
        .iter()
        .filter(|p| !p.is_casualty() && !state.reaction_rolls.contains_key(&p.id))
        .filter_map(|p| state.rolling_side(p).map(|side| (side, &p.id)))
        .min_by_key(|(side, _)| *side)
        .map(|(_, id)| id)
}

fn reactions(participant: &Participant) -> i32 {
    calculate_effective_stats(participant, StatContext::ReactionRoll).reactions
}

/// Roll initiative for one participant: success iff the die is at most the
/// effective reactions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollInitiativeAction {
    pub participant: ParticipantId,
}

impl ActionTransition for RollInitiativeAction {
    fn kind(&self) -> ActionKind {
        ActionKind::RollInitiative
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.participant)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        ensure_reaction_phase(state)?;
        let participant = state
            .participant(&self.participant)
            .ok_or_else(|| ActionError::ParticipantNotFound(self.participant.clone()))?;
        let side = state
            .rolling_side(participant)
            .filter(|_| !participant.is_casualty())
            .ok_or_else(|| ActionError::InvalidTarget(self.participant.clone()))?;

        if state.reaction_rolls.contains_key(&self.participant) {
            return Err(ActionError::InitiativeAlreadyRolled(self.participant.clone()));
        }

        // Multiplayer rolls are turn-based: the host's team goes first.
        if side == RollingSide::Guest
            && side_members(state, RollingSide::Host)
                .any(|p| !state.reaction_rolls.contains_key(&p.id))
        {
            return Err(ActionError::InitiativeOutOfOrder(self.participant.clone()));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = state
            .participant(&self.participant)
            .ok_or_else(|| ActionError::ParticipantNotFound(self.participant.clone()))?;
        let reactions = reactions(participant);
        let roll = dice_for(state, env, &self.participant)?.d6();
        let success = roll as i32 <= reactions;

        debug!(participant = %self.participant, roll, reactions, success, "initiative rolled");
        state
            .reaction_rolls
            .insert(self.participant.clone(), ReactionRoll { roll, success });
        state.push_log(
            LogEntry::new("initiative_rolled")
                .source(&self.participant)
                .param("roll", roll)
                .param("reactions", reactions)
                .param("success", if success { "yes" } else { "no" }),
        );
        Ok(())
    }
}

/// Spend a story point to reroll every failed initiative die of a side.
///
/// Once per battle per side. Rerolls carry +1 on the die unless a member of
/// the side is a [`SpecialAbility::Tactician`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeizeInitiativeAction {
    pub side: RollingSide,
}

impl ActionTransition for SeizeInitiativeAction {
    fn kind(&self) -> ActionKind {
        ActionKind::SeizeInitiative
    }

    fn actor(&self) -> Option<&ParticipantId> {
        None
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        ensure_reaction_phase(state)?;
        let unavailable = || ActionError::SeizeUnavailable(self.side);

        if state.initiative_seized.contains(&self.side) {
            return Err(unavailable());
        }
        if state.story_points.get(&self.side).copied().unwrap_or(0) == 0 {
            return Err(unavailable());
        }
        if let Some(missing) =
            side_members(state, self.side).find(|p| !state.reaction_rolls.contains_key(&p.id))
        {
            return Err(ActionError::InitiativeOutOfOrder(missing.id.clone()));
        }
        let any_failed = side_members(state, self.side)
            .any(|p| state.reaction_rolls.get(&p.id).is_some_and(|r| !r.success));
        if !any_failed {
            return Err(unavailable());
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let tactician =
            side_members(state, self.side).any(|p| p.has_ability(SpecialAbility::Tactician));
        let penalty = if tactician { 0 } else { 1 };
        let failed: Vec<(ParticipantId, i32)> = side_members(state, self.side)
            .filter(|p| state.reaction_rolls.get(&p.id).is_some_and(|r| !r.success))
            .map(|p| (p.id.clone(), reactions(p)))
            .collect();
        let Some((first, _)) = failed.first() else {
            return Ok(());
        };
        let mut dice = dice_for(state, env, first)?;

        for (id, reactions) in &failed {
            let roll = dice.d6() + penalty;
            let success = roll as i32 <= *reactions;
            state
                .reaction_rolls
                .insert(id.clone(), ReactionRoll { roll, success });
            state.push_log(
                LogEntry::new("initiative_rerolled")
                    .source(id)
                    .param("roll", roll)
                    .param("success", if success { "yes" } else { "no" }),
            );
        }

        if let Some(points) = state.story_points.get_mut(&self.side) {
            *points = points.saturating_sub(1);
        }
        state.initiative_seized.insert(self.side);
        state.push_log(
            LogEntry::new("initiative_seized")
                .param("side", self.side.as_ref())
                .param("rerolls", failed.len()),
        );
        Ok(())
    }
}

/// Close the reaction roll and start the activation phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinishReactionRollAction;

impl ActionTransition for FinishReactionRollAction {
    fn kind(&self) -> ActionKind {
        ActionKind::FinishReactionRoll
    }

    fn actor(&self) -> Option<&ParticipantId> {
        None
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        ensure_reaction_phase(state)?;
        if let Some(missing) = first_missing_roll(state) {
            return Err(ActionError::InitiativeOutOfOrder(missing.clone()));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        turns::start_activations(state);
        Ok(())
    }
}
