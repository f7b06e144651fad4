//! Broadcast of everything the worker resolves.

use battle_core::{
    ActionKind, ActionReport, BattlePhase, ExecuteError, MissionStatus, ParticipantId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification published by the battle worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A request was resolved. `nonce` is the state nonce after resolution.
    ActionResolved {
        nonce: u64,
        by_enemy: bool,
        report: ActionReport,
    },

    /// A request was refused; the state is unchanged.
    ActionRejected {
        kind: ActionKind,
        actor: Option<ParticipantId>,
        error: ExecuteError,
    },

    PhaseChanged {
        round: u32,
        from: BattlePhase,
        to: BattlePhase,
    },

    /// An enemy took the active slot during the enemy phase.
    EnemyActivated { enemy: ParticipantId },

    BattleEnded { round: u32, status: MissionStatus },
}

/// Single-topic broadcast bus.
///
/// Publishing never blocks; subscribers that fall more than the configured
/// capacity behind observe `RecvError::Lagged`.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<BattleEvent>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: BattleEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("no battle event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::with_capacity(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(BattleEvent::EnemyActivated {
            enemy: ParticipantId::new("e1"),
        });

        let event = rx.recv().await.expect("event");
        assert_eq!(
            event,
            BattleEvent::EnemyActivated {
                enemy: ParticipantId::new("e1")
            }
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(1);
        bus.publish(BattleEvent::BattleEnded {
            round: 1,
            status: MissionStatus::Failure,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
