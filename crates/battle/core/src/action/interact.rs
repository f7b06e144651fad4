use super::validation::{self, active_actor};
use super::{ActionError, ActionKind, ActionTransition, dice_for, index_of};
use crate::env::BattleEnv;
use crate::state::{ActionsTaken, BattleState, LogEntry, ObjectiveKind, ParticipantId};
use crate::stats::{StatContext, calculate_effective_stats};

/// Work an adjacent mission objective.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractAction {
    pub actor: ParticipantId,
    pub objective: String,
}

impl ActionTransition for InteractAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Interact
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = active_actor(state, &self.actor)?;
        validation::ensure_actions(participant, 1)?;
        validation::ensure_combat(state, participant, ActionKind::Interact)?;

        let objective = state
            .mission
            .objective(&self.objective)
            .filter(|o| !o.is_complete())
            .ok_or_else(|| ActionError::ObjectiveUnavailable(self.objective.clone()))?;
        if objective.position.distance(participant.position) > 1 {
            return Err(ActionError::ObjectiveOutOfReach(self.objective.clone()));
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        let kind = state
            .mission
            .objective(&self.objective)
            .map(|o| o.kind)
            .ok_or_else(|| ActionError::ObjectiveUnavailable(self.objective.clone()))?;

        let participant = &mut state.participants[index];
        validation::spend_combat(participant, 1);
        participant.actions_taken |= ActionsTaken::INTERACT;

        let completed = match kind {
            ObjectiveKind::AccessConsole => {
                let savvy =
                    calculate_effective_stats(&state.participants[index], StatContext::General)
                        .savvy;
                let roll = dice_for(state, env, &self.actor)?.d6();
                let total = roll as i32 + savvy;
                let success = total >= env.config().console_target;
                if !success {
                    state.push_log(
                        LogEntry::new("console_access_failed")
                            .source(&self.actor)
                            .param("objective", self.objective.as_str())
                            .param("roll", roll)
                            .param("total", total),
                    );
                }
                success
            }
            ObjectiveKind::PickUpItem => {
                state.participants[index].carrying = Some(self.objective.clone());
                true
            }
            ObjectiveKind::PlacePackage
            | ObjectiveKind::ScanPatrolPoint
            | ObjectiveKind::Search => true,
        };

        if completed {
            if let Some(objective) = state.mission.objective_mut(&self.objective) {
                objective.completed_by = Some(self.actor.clone());
            }
            state.push_log(
                LogEntry::new("objective_completed")
                    .source(&self.actor)
                    .param("objective", self.objective.as_str())
                    .param("kind", kind.as_ref()),
            );
        }
        Ok(())
    }
}
