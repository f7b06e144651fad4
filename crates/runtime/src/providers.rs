//! Asynchronous source of requests for player-controlled participants.
//!
//! The worker plays enemies on its own; crew members need someone to decide
//! for them. Runtime users plug in a [`CrewProvider`] so the battle can run
//! with human input, scripted fixtures, or an AI policy.
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{
    ActionRequest, ArmoryOracle, BattleConfig, BattleEnv, BattlePhase, BattleState,
    EnemyDecider, ParticipantId,
};

use crate::error::Result;

/// Decides the next request for a crew member.
#[async_trait]
pub trait CrewProvider: Send + Sync {
    /// Provide a request for `actor` given a read-only snapshot.
    ///
    /// During the reaction roll `actor` is the next participant that owes an
    /// initiative die; otherwise it is the active participant.
    async fn provide_request(
        &self,
        actor: &ParticipantId,
        state: &BattleState,
    ) -> Result<ActionRequest>;
}

/// Plays the crew with an [`EnemyDecider`], rolling initiative when asked.
///
/// Plans against the same armory and rules the battle is resolved with.
pub struct AiCrewProvider {
    decider: Arc<dyn EnemyDecider>,
    armory: Arc<dyn ArmoryOracle>,
    config: BattleConfig,
}

impl AiCrewProvider {
    pub fn new(
        decider: Arc<dyn EnemyDecider>,
        armory: Arc<dyn ArmoryOracle>,
        config: BattleConfig,
    ) -> Self {
        Self {
            decider,
            armory,
            config,
        }
    }
}

#[async_trait]
impl CrewProvider for AiCrewProvider {
    async fn provide_request(
        &self,
        actor: &ParticipantId,
        state: &BattleState,
    ) -> Result<ActionRequest> {
        if state.phase == BattlePhase::ReactionRoll {
            return Ok(ActionRequest::roll_initiative(actor.clone()));
        }
        let env = BattleEnv::empty()
            .with_armory(self.armory.as_ref())
            .with_config(&self.config);
        Ok(self.decider.decide(state, &env, actor))
    }
}
