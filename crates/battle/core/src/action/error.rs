use super::ActionKind;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{
    BattlePhase, ParticipantId, Position, RollingSide, SpecialAbility, WorldTrait,
};

/// Why a request was rejected.
///
/// A rejected request never mutates the battle state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("not allowed during {}", .phase.as_str())]
    PhaseMismatch { phase: BattlePhase },

    #[error("{0} is not the active participant")]
    NotActiveParticipant(ParticipantId),

    #[error("needs {required} action(s), {remaining} remaining")]
    InsufficientActions { required: u8, remaining: u8 },

    #[error("{0} already used this turn")]
    AlreadyActed(ActionKind),

    #[error("target at distance {distance} exceeds range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("no line of sight to target")]
    NoLineOfSight,

    #[error("{0:?} cannot be reached")]
    Unreachable(Position),

    #[error("target is not adjacent")]
    NotEngaged,

    #[error("engaged participant must brawl")]
    MustBrawl,

    #[error("{0} must resolve a follow-up move first")]
    FollowUpPending(ParticipantId),

    #[error("requires the {0} ability")]
    AbilityUnavailable(SpecialAbility),

    #[error("forbidden by the {0} world trait")]
    WorldTraitForbids(WorldTrait),

    #[error("suppressed participants can only panic fire")]
    Suppressed,

    #[error("terrified participants can only flee")]
    Terrified,

    #[error("objective '{0}' is out of reach")]
    ObjectiveOutOfReach(String),

    #[error("objective '{0}' is unknown or already complete")]
    ObjectiveUnavailable(String),

    #[error("consumable use limit reached this turn")]
    ConsumableLimit,

    #[error("this participant cannot use consumables")]
    ConsumablesForbidden,

    #[error("consumable '{0}' is not carried or not known")]
    ConsumableUnavailable(String),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("target {0} not found")]
    TargetNotFound(ParticipantId),

    #[error("weapon '{0}' is unavailable")]
    WeaponUnavailable(String),

    #[error("{0} is not a valid target")]
    InvalidTarget(ParticipantId),

    #[error("no valid targets")]
    NoValidTargets,

    #[error("{0} has already rolled initiative")]
    InitiativeAlreadyRolled(ParticipantId),

    #[error("initiative for {0} is out of order")]
    InitiativeOutOfOrder(ParticipantId),

    #[error("{0} cannot seize the initiative")]
    SeizeUnavailable(RollingSide),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            OutOfRange { .. } | NoLineOfSight | Unreachable(_) | NotEngaged | NoValidTargets
            | ObjectiveOutOfReach(_) => ErrorSeverity::Recoverable,
            Oracle(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            PhaseMismatch { .. } => "ACTION_PHASE_MISMATCH",
            NotActiveParticipant(_) => "ACTION_NOT_ACTIVE_PARTICIPANT",
            InsufficientActions { .. } => "ACTION_INSUFFICIENT_ACTIONS",
            AlreadyActed(_) => "ACTION_ALREADY_ACTED",
            OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            NoLineOfSight => "ACTION_NO_LINE_OF_SIGHT",
            Unreachable(_) => "ACTION_UNREACHABLE",
            NotEngaged => "ACTION_NOT_ENGAGED",
            MustBrawl => "ACTION_MUST_BRAWL",
            FollowUpPending(_) => "ACTION_FOLLOW_UP_PENDING",
            AbilityUnavailable(_) => "ACTION_ABILITY_UNAVAILABLE",
            WorldTraitForbids(_) => "ACTION_WORLD_TRAIT_FORBIDS",
            Suppressed => "ACTION_SUPPRESSED",
            Terrified => "ACTION_TERRIFIED",
            ObjectiveOutOfReach(_) => "ACTION_OBJECTIVE_OUT_OF_REACH",
            ObjectiveUnavailable(_) => "ACTION_OBJECTIVE_UNAVAILABLE",
            ConsumableLimit => "ACTION_CONSUMABLE_LIMIT",
            ConsumablesForbidden => "ACTION_CONSUMABLES_FORBIDDEN",
            ConsumableUnavailable(_) => "ACTION_CONSUMABLE_UNAVAILABLE",
            ParticipantNotFound(_) => "ACTION_PARTICIPANT_NOT_FOUND",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            WeaponUnavailable(_) => "ACTION_WEAPON_UNAVAILABLE",
            InvalidTarget(_) => "ACTION_INVALID_TARGET",
            NoValidTargets => "ACTION_NO_VALID_TARGETS",
            InitiativeAlreadyRolled(_) => "ACTION_INITIATIVE_ALREADY_ROLLED",
            InitiativeOutOfOrder(_) => "ACTION_INITIATIVE_OUT_OF_ORDER",
            SeizeUnavailable(_) => "ACTION_SEIZE_UNAVAILABLE",
            Oracle(err) => err.error_code(),
        }
    }
}
