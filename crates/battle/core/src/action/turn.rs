use super::validation::active_actor;
use super::{ActionError, ActionKind, ActionTransition};
use crate::engine::turns;
use crate::env::BattleEnv;
use crate::state::{BattleState, ParticipantId};

/// Give up the rest of the active participant's turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnAction {
    pub actor: ParticipantId,
}

impl ActionTransition for EndTurnAction {
    fn kind(&self) -> ActionKind {
        ActionKind::EndTurn
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        active_actor(state, &self.actor).map(|_| ())
    }

    fn apply(&self, state: &mut BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        turns::end_turn(state);
        Ok(())
    }
}
