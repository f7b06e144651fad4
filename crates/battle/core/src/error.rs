//! Shared error classification for battle-core.
//!
//! Concrete error enums live beside the code that raises them
//! ([`crate::action::ActionError`], [`crate::env::OracleError`],
//! [`crate::engine::ExecuteError`]) and implement [`GameError`] so callers can
//! treat them uniformly.

/// How a caller should react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Worth retrying with a different request (target out of range, ...).
    Recoverable,
    /// Malformed or illegal request. Do not retry unchanged.
    Validation,
    /// State inconsistency. Indicates a bug.
    Internal,
    /// The battle cannot continue (e.g. a required oracle is missing).
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common interface of every battle-core error.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier, suitable for metrics and assertions.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
