//! Cloneable façade over the battle worker.
//!
//! [`BattleHandle`] hides the channel plumbing: requests travel to the worker
//! over a bounded queue and come back on a oneshot, reads are served from the
//! latest published snapshot without touching the queue.
use std::sync::Arc;

use battle_core::{ActionReport, ActionRequest, BattleState, ParticipantId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::error::{Result, RuntimeError};
use crate::events::{BattleEvent, EventBus};
use crate::worker::Command;

/// Client-facing handle to a running battle.
#[derive(Clone)]
pub struct BattleHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Arc<BattleState>>,
    event_bus: EventBus,
}

impl BattleHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        snapshot_rx: watch::Receiver<Arc<BattleState>>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            command_tx,
            snapshot_rx,
            event_bus,
        }
    }

    /// Queue a request and wait for its resolution.
    ///
    /// A rule rejection comes back as [`RuntimeError::Execute`]; the battle
    /// state is unchanged in that case.
    pub async fn submit(&self, request: ActionRequest) -> Result<ActionReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Submit {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        let result = reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?;
        Ok(result?)
    }

    /// Close the reaction roll and start the quick actions phase.
    pub async fn finish_reaction_roll(&self) -> Result<ActionReport> {
        self.submit(ActionRequest::finish_reaction_roll()).await
    }

    /// End the activation of `participant`.
    pub async fn end_turn(&self, participant: impl Into<ParticipantId>) -> Result<ActionReport> {
        self.submit(ActionRequest::end_turn(participant)).await
    }

    /// Latest published state. Never blocks on the worker.
    pub fn snapshot(&self) -> Arc<BattleState> {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait until every queued request, and any enemy phase it started, has
    /// been played out, then return the resulting state.
    pub async fn wait_idle(&self) -> Result<Arc<BattleState>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Idle { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Stream of every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.event_bus.subscribe()
    }

    /// Receiver notified whenever a new snapshot is published.
    pub fn watch(&self) -> watch::Receiver<Arc<BattleState>> {
        self.snapshot_rx.clone()
    }
}
