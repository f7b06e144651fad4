//! Round structure bookkeeping.

use super::{MissionStatus, ParticipantId};

/// State of the round state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    ReactionRoll,
    QuickActions,
    SlowActions,
    EnemyActions,
    /// Terminal. Carries the resolved mission status.
    BattleOver(MissionStatus),
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::ReactionRoll => "reaction_roll",
            BattlePhase::QuickActions => "quick_actions",
            BattlePhase::SlowActions => "slow_actions",
            BattlePhase::EnemyActions => "enemy_actions",
            BattlePhase::BattleOver(_) => "battle_over",
        }
    }

    /// Phases in which a participant holds the active slot.
    pub fn is_activation(&self) -> bool {
        matches!(
            self,
            BattlePhase::QuickActions | BattlePhase::SlowActions | BattlePhase::EnemyActions
        )
    }

    pub fn is_over(&self) -> bool {
        matches!(self, BattlePhase::BattleOver(_))
    }
}

/// Bonus off-economy move owed to a participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowUpState {
    pub participant_id: ParticipantId,
    pub max_move: u32,
}

/// Recorded initiative die for one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionRoll {
    pub roll: u32,
    pub success: bool,
}

/// Group of participants that roll initiative together and share story points.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RollingSide {
    /// The player crew in a solo battle.
    Crew,
    Host,
    Guest,
}
