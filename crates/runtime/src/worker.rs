//! Worker task that owns the authoritative [`BattleState`].
//!
//! Receives commands from [`crate::BattleHandle`], resolves them through
//! [`BattleEngine`], refreshes the shared snapshot and publishes events.
//! Whenever a command leaves the battle in the enemy phase the worker plays
//! that phase to completion before it reads the next command, so pacing
//! delays never interleave with request handling.

use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    ActionReport, ActionRequest, ArmoryOracle, BattleConfig, BattleEngine, BattleEnv,
    BattlePhase, BattleState, EnemyDecider, ExecuteError, MAX_ENEMY_STEPS, MissionJudge,
    RngOracle,
};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use crate::events::{BattleEvent, EventBus};

/// Commands accepted by the worker.
pub(crate) enum Command {
    Submit {
        request: ActionRequest,
        reply: oneshot::Sender<Result<ActionReport, ExecuteError>>,
    },
    /// Replies once every earlier command, and any enemy phase they
    /// triggered, has been handled.
    Idle {
        reply: oneshot::Sender<Arc<BattleState>>,
    },
}

/// Collaborators handed to the engine on every resolution.
pub(crate) struct Oracles {
    pub armory: Arc<dyn ArmoryOracle>,
    pub rng: Arc<dyn RngOracle>,
    pub judge: Arc<dyn MissionJudge>,
    pub decider: Arc<dyn EnemyDecider>,
    pub config: BattleConfig,
}

impl Oracles {
    fn env(&self) -> BattleEnv<'_> {
        BattleEnv::with_all(
            self.armory.as_ref(),
            self.rng.as_ref(),
            self.judge.as_ref(),
            &self.config,
        )
    }
}

pub(crate) struct BattleWorker {
    state: BattleState,
    oracles: Oracles,
    command_rx: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<Arc<BattleState>>,
    event_bus: EventBus,
    enemy_step_delay: Duration,
}

impl BattleWorker {
    pub(crate) fn new(
        state: BattleState,
        oracles: Oracles,
        command_rx: mpsc::Receiver<Command>,
        snapshot_tx: watch::Sender<Arc<BattleState>>,
        event_bus: EventBus,
        enemy_step_delay: Duration,
    ) -> Self {
        info!(
            participants = state.participants.len(),
            round = state.round,
            phase = state.phase.as_str(),
            "battle worker initialized"
        );

        Self {
            state,
            oracles,
            command_rx,
            snapshot_tx,
            event_bus,
            enemy_step_delay,
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub(crate) async fn run(mut self) {
        // A battle may be handed over mid enemy phase.
        self.play_enemy_phase().await;

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
            self.play_enemy_phase().await;
        }

        debug!("command channel closed; battle worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit { request, reply } => {
                let result = self.resolve(&request);
                if reply.send(result).is_err() {
                    debug!("submit reply channel closed (caller dropped)");
                }
            }
            Command::Idle { reply } => {
                if reply.send(self.snapshot_tx.borrow().clone()).is_err() {
                    debug!("idle reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn resolve(&mut self, request: &ActionRequest) -> Result<ActionReport, ExecuteError> {
        let before = self.state.phase;
        let result = BattleEngine::new(&mut self.state).execute(self.oracles.env(), request);

        match &result {
            Ok(report) => self.announce(before, report, false),
            Err(err) => {
                debug!(kind = %request.kind(), error = %err, "request rejected");
                self.event_bus.publish(BattleEvent::ActionRejected {
                    kind: request.kind(),
                    actor: request.actor().cloned(),
                    error: err.clone(),
                });
            }
        }
        result
    }

    /// Plays enemy steps until the phase is left, pausing after each one.
    async fn play_enemy_phase(&mut self) {
        let mut last_enemy = None;
        let mut steps = 0;
        while self.state.phase == BattlePhase::EnemyActions {
            if steps == MAX_ENEMY_STEPS {
                error!(round = self.state.round, "enemy phase exceeded its step budget");
                return;
            }
            steps += 1;

            let active = self.state.active_participant_id.clone();
            if let Some(enemy) = active.clone()
                && active != last_enemy
            {
                debug!(enemy = %enemy, "enemy activated");
                self.event_bus.publish(BattleEvent::EnemyActivated { enemy });
                last_enemy = active;
            }

            let before = self.state.phase;
            let step = BattleEngine::new(&mut self.state)
                .enemy_step(self.oracles.env(), self.oracles.decider.as_ref());

            match step {
                Ok(Some(report)) => self.announce(before, &report, true),
                Ok(None) => return,
                Err(err) => {
                    error!(error = %err, "enemy step failed; enemy phase abandoned");
                    return;
                }
            }

            if !self.enemy_step_delay.is_zero() {
                tokio::time::sleep(self.enemy_step_delay).await;
            }
        }
    }

    fn announce(&self, before: BattlePhase, report: &ActionReport, by_enemy: bool) {
        self.snapshot_tx.send_replace(Arc::new(self.state.clone()));

        self.event_bus.publish(BattleEvent::ActionResolved {
            nonce: self.state.nonce,
            by_enemy,
            report: report.clone(),
        });

        let after = self.state.phase;
        if after != before {
            debug!(
                from = before.as_str(),
                to = after.as_str(),
                round = self.state.round,
                "phase changed"
            );
            self.event_bus.publish(BattleEvent::PhaseChanged {
                round: self.state.round,
                from: before,
                to: after,
            });
        }

        if let BattlePhase::BattleOver(status) = after
            && !before.is_over()
        {
            info!(round = self.state.round, %status, "battle over");
            self.event_bus.publish(BattleEvent::BattleEnded {
                round: self.state.round,
                status,
            });
        }
    }
}

