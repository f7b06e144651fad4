//! Errors surfaced by the runtime API.
//!
//! Rule rejections from the engine pass through untouched as
//! [`RuntimeError::Execute`] so callers can still inspect the
//! [`battle_core::ActionError`].
use battle_core::{ErrorSeverity, ExecuteError, GameError, ParticipantId};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires an initial battle state")]
    MissingState,

    #[error("enemy phase did not finish; the worker gave up on it")]
    EnemyPhaseStalled,

    #[error("no participant is waiting to act")]
    NoPendingActor,

    #[error("crew provider failed for {actor}: {reason}")]
    Provider {
        actor: ParticipantId,
        reason: String,
    },
}

impl RuntimeError {
    /// The rule rejection behind this error, if any.
    pub fn execute_error(&self) -> Option<&ExecuteError> {
        match self {
            RuntimeError::Execute(err) => Some(err),
            _ => None,
        }
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Execute(err) => err.severity(),
            RuntimeError::NoPendingActor | RuntimeError::Provider { .. } => {
                ErrorSeverity::Recoverable
            }
            RuntimeError::MissingState => ErrorSeverity::Validation,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::EnemyPhaseStalled => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Execute(err) => err.error_code(),
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::MissingState => "RUNTIME_MISSING_STATE",
            RuntimeError::EnemyPhaseStalled => "RUNTIME_ENEMY_PHASE_STALLED",
            RuntimeError::NoPendingActor => "RUNTIME_NO_PENDING_ACTOR",
            RuntimeError::Provider { .. } => "RUNTIME_PROVIDER",
        }
    }
}
