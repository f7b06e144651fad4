use std::sync::Arc;

use battle_core::{
    ActionReport, ActionRequest, ArmoryOracle, ArmorySnapshot, BattleConfig, BattlePhase,
    BattleState, ClosestTargetAi, EnemyDecider, ExecuteError, MissionJudge, MissionStatus,
    ObjectiveMissionJudge, ParticipantId, PcgRng, RngOracle, action::first_missing_roll,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::EventBus;
use crate::handle::BattleHandle;
use crate::providers::CrewProvider;
use crate::worker::{BattleWorker, Command, Oracles};

/// Result of one [`Runtime::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Resolved(ActionReport),
    /// The provider's request was refused and the turn was ended instead.
    Fallback {
        rejected: ExecuteError,
        report: ActionReport,
    },
    Finished(MissionStatus),
}

/// Owns the battle worker and drives the crew through a [`CrewProvider`].
///
/// [`BattleHandle`] is the cloneable façade for everything else.
pub struct Runtime {
    handle: BattleHandle,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    /// Ask `provider` for the next crew request and resolve it.
    ///
    /// Waits for any running enemy phase first. A refused request is logged
    /// and replaced by ending the actor's turn, so a confused provider cannot
    /// stall the battle.
    pub async fn step(&self, provider: &dyn CrewProvider) -> Result<StepOutcome> {
        let state = self.handle.wait_idle().await?;

        let actor = match state.phase {
            BattlePhase::BattleOver(status) => return Ok(StepOutcome::Finished(status)),
            BattlePhase::EnemyActions => return Err(RuntimeError::EnemyPhaseStalled),
            BattlePhase::ReactionRoll => match first_missing_roll(&state) {
                Some(actor) => actor.clone(),
                None => {
                    let report = self.handle.finish_reaction_roll().await?;
                    return Ok(StepOutcome::Resolved(report));
                }
            },
            BattlePhase::QuickActions | BattlePhase::SlowActions => state
                .active_participant_id
                .clone()
                .ok_or(RuntimeError::NoPendingActor)?,
        };

        let request = provider.provide_request(&actor, &state).await?;
        debug!(actor = %actor, kind = %request.kind(), "crew request");

        match self.handle.submit(request).await {
            Ok(report) => Ok(StepOutcome::Resolved(report)),
            Err(RuntimeError::Execute(rejected @ ExecuteError::Rejected { .. }))
                if state.phase.is_activation() =>
            {
                warn!(actor = %actor, error = %rejected, "crew request rejected; ending its turn");
                let report = self.handle.submit(fallback(&state, &actor)).await?;
                Ok(StepOutcome::Fallback { rejected, report })
            }
            Err(err) => Err(err),
        }
    }

    /// Step until the battle is decided or `max_rounds` have been started.
    ///
    /// Returns `None` when the round limit stopped the battle.
    pub async fn run(
        &self,
        provider: &dyn CrewProvider,
        max_rounds: u32,
    ) -> Result<Option<MissionStatus>> {
        loop {
            if let StepOutcome::Finished(status) = self.step(provider).await? {
                return Ok(Some(status));
            }
            if self.handle.snapshot().round > max_rounds {
                return Ok(None);
            }
        }
    }

    /// Drop the handle and wait for the worker to drain.
    ///
    /// Clones of the handle held elsewhere keep the worker alive.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

fn fallback(state: &BattleState, actor: &ParticipantId) -> ActionRequest {
    let pending = state
        .follow_up_state
        .as_ref()
        .is_some_and(|f| &f.participant_id == actor);
    if pending {
        ActionRequest::skip_follow_up(actor.clone())
    } else {
        ActionRequest::end_turn(actor.clone())
    }
}

/// Builder for [`Runtime`].
///
/// Only the initial state is required. The armory defaults to an empty
/// catalogue, dice to [`PcgRng`], the judge to [`ObjectiveMissionJudge`] and
/// enemies to [`ClosestTargetAi`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    battle_config: BattleConfig,
    state: Option<BattleState>,
    armory: Option<Arc<dyn ArmoryOracle>>,
    rng: Option<Arc<dyn RngOracle>>,
    judge: Option<Arc<dyn MissionJudge>>,
    decider: Option<Arc<dyn EnemyDecider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            battle_config: BattleConfig::default(),
            state: None,
            armory: None,
            rng: None,
            judge: None,
            decider: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn battle_config(mut self, config: BattleConfig) -> Self {
        self.battle_config = config;
        self
    }

    pub fn state(mut self, state: BattleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn armory(mut self, armory: Arc<dyn ArmoryOracle>) -> Self {
        self.armory = Some(armory);
        self
    }

    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn judge(mut self, judge: Arc<dyn MissionJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn decider(mut self, decider: Arc<dyn EnemyDecider>) -> Self {
        self.decider = Some(decider);
        self
    }

    /// Spawn the worker. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let mut state = self.state.ok_or(RuntimeError::MissingState)?;
        if let Some(seed) = self.config.seed {
            debug!(seed, "overriding battle seed");
            state.seed = seed;
        }

        let oracles = Oracles {
            armory: self
                .armory
                .unwrap_or_else(|| Arc::new(ArmorySnapshot::new())),
            rng: self.rng.unwrap_or_else(|| Arc::new(PcgRng)),
            judge: self.judge.unwrap_or_else(|| Arc::new(ObjectiveMissionJudge)),
            decider: self.decider.unwrap_or_else(|| Arc::new(ClosestTargetAi)),
            config: self.battle_config,
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(state.clone()));
        let event_bus = EventBus::with_capacity(self.config.event_capacity);

        let handle = BattleHandle::new(command_tx, snapshot_rx, event_bus.clone());
        let worker = BattleWorker::new(
            state,
            oracles,
            command_rx,
            snapshot_tx,
            event_bus,
            self.config.enemy_step_delay,
        );

        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime { handle, worker })
    }
}

