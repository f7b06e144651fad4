use tracing::debug;

use super::validation::{self, active_actor};
use super::{ActionError, ActionKind, ActionTransition, dice_for, index_of};
use crate::env::BattleEnv;
use crate::geometry::{find_reachable_cells, line_path};
use crate::rules;
use crate::state::{BattleState, LogEntry, ParticipantId, Position, WorldTrait};

/// Walk (or dash) to a reachable cell.
///
/// Under a terrifying effect the only legal destination is the flee cell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: ParticipantId,
    pub destination: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dash: bool,
}

impl ActionTransition for MoveAction {
    fn kind(&self) -> ActionKind {
        if self.dash {
            ActionKind::Dash
        } else {
            ActionKind::Move
        }
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = active_actor(state, &self.actor)?;
        validation::ensure_can_move(participant, self.kind())?;
        if self.dash {
            validation::ensure_not_terrified(participant)?;
        }

        let options = rules::movement_options(state, participant, self.dash, env.config());
        if !options.contains_key(&self.destination) {
            return Err(ActionError::Unreachable(self.destination));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        let participant = &mut state.participants[index];
        let from = participant.position;
        let fled = participant.active_effects.terrified_by().is_some();

        participant.position = self.destination;
        validation::spend_move(participant, self.dash);

        let key = match (fled, self.dash) {
            (true, _) => "fled",
            (false, true) => "dashed",
            (false, false) => "moved",
        };
        debug!(actor = %self.actor, ?from, to = ?self.destination, key, "participant moved");
        state.push_log(
            LogEntry::new(key)
                .source(&self.actor)
                .param("x", self.destination.x)
                .param("y", self.destination.y)
                .param("distance", from.distance(self.destination)),
        );
        Ok(())
    }
}

/// Slide across ice toward a cell. Only on frozen battlefields.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlideAction {
    pub actor: ParticipantId,
    pub toward: Position,
}

impl ActionTransition for SlideAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Slide
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = active_actor(state, &self.actor)?;
        if !state.has_trait(WorldTrait::Frozen) {
            return Err(ActionError::WorldTraitForbids(WorldTrait::Frozen));
        }
        validation::ensure_can_move(participant, ActionKind::Slide)?;
        validation::ensure_not_terrified(participant)?;
        if self.toward == participant.position || !state.grid.contains(self.toward) {
            return Err(ActionError::Unreachable(self.toward));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        let roll = dice_for(state, env, &self.actor)?.roll(env.config().slide_die);
        let from = state.participants[index].position;

        let landing = {
            let geometry = state.geometry();
            line_path(from, self.toward)
                .into_iter()
                .skip(1)
                .take(roll as usize)
                .take_while(|cell| geometry.is_cell_walkable(*cell, Some(&self.actor)))
                .last()
                .unwrap_or(from)
        };

        let participant = &mut state.participants[index];
        participant.position = landing;
        validation::spend_move(participant, false);
        state.push_log(
            LogEntry::new("slid")
                .source(&self.actor)
                .param("roll", roll)
                .param("x", landing.x)
                .param("y", landing.y),
        );
        Ok(())
    }
}

/// Teleport up to a rolled distance.
///
/// Lands on the requested cell when it is walkable and within the roll,
/// otherwise on the furthest walkable cell of the line toward it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeleportAction {
    pub actor: ParticipantId,
    pub destination: Position,
}

impl ActionTransition for TeleportAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Teleport
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = active_actor(state, &self.actor)?;
        validation::ensure_teleport_allowed(state, participant)?;
        validation::ensure_can_move(participant, ActionKind::Teleport)?;
        validation::ensure_not_terrified(participant)?;
        if self.destination == participant.position || !state.grid.contains(self.destination) {
            return Err(ActionError::Unreachable(self.destination));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        let roll = dice_for(state, env, &self.actor)?.roll(env.config().teleport_die);
        let from = state.participants[index].position;

        let landing = {
            let geometry = state.geometry();
            let walkable = |cell: Position| geometry.is_cell_walkable(cell, Some(&self.actor));
            if from.distance(self.destination) <= roll && walkable(self.destination) {
                self.destination
            } else {
                line_path(from, self.destination)
                    .into_iter()
                    .skip(1)
                    .filter(|cell| from.distance(*cell) <= roll && walkable(*cell))
                    .last()
                    .unwrap_or(from)
            }
        };

        let participant = &mut state.participants[index];
        participant.position = landing;
        validation::spend_move(participant, false);
        state.push_log(
            LogEntry::new(if landing == from { "teleport_failed" } else { "teleported" })
                .source(&self.actor)
                .param("roll", roll)
                .param("x", landing.x)
                .param("y", landing.y),
        );
        Ok(())
    }
}

/// Resolve a pending follow-up move: move up to the granted distance, or
/// skip it with `destination: None`. Costs no actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowUpAction {
    pub actor: ParticipantId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub destination: Option<Position>,
}

impl ActionTransition for FollowUpAction {
    fn kind(&self) -> ActionKind {
        match self.destination {
            Some(_) => ActionKind::FollowUpMove,
            None => ActionKind::SkipFollowUp,
        }
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = state
            .participant(&self.actor)
            .ok_or_else(|| ActionError::ParticipantNotFound(self.actor.clone()))?;
        let follow_up = state
            .follow_up_state
            .as_ref()
            .filter(|f| f.participant_id == self.actor)
            .ok_or_else(|| ActionError::NotActiveParticipant(self.actor.clone()))?;

        if let Some(destination) = self.destination {
            let reachable = find_reachable_cells(
                participant.position,
                follow_up.max_move,
                &state.geometry(),
                Some(&self.actor),
            );
            if !reachable.contains_key(&destination) {
                return Err(ActionError::Unreachable(destination));
            }
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        state.follow_up_state = None;

        let entry = match self.destination {
            Some(destination) => {
                state.participants[index].position = destination;
                LogEntry::new("follow_up_moved")
                    .param("x", destination.x)
                    .param("y", destination.y)
            }
            None => LogEntry::new("follow_up_skipped"),
        };
        state.push_log(entry.source(&self.actor));
        Ok(())
    }

    fn post_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        if state.follow_up_state.is_some() {
            return Err(ActionError::FollowUpPending(self.actor.clone()));
        }
        Ok(())
    }
}
