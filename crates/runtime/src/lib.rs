//! Async host for a single battle.
//!
//! A background worker owns the authoritative [`battle_core::BattleState`]
//! and is the only writer. Clients talk to it through a cloneable
//! [`BattleHandle`]: requests are queued and resolved one at a time, reads go
//! through immutable [`std::sync::Arc`] snapshots, and every resolution is
//! broadcast as a [`BattleEvent`]. The enemy phase is played by the worker
//! itself, one paced step at a time.
//!
//! ```rust,ignore
//! let runtime = Runtime::builder()
//!     .state(state)
//!     .armory(Arc::new(armory))
//!     .build()?;
//! let handle = runtime.handle();
//! let mut events = handle.subscribe();
//! handle.submit(ActionRequest::roll_initiative("c1")).await?;
//! ```
mod config;
mod error;
mod events;
mod handle;
mod providers;
mod runtime;
mod worker;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{BattleEvent, EventBus};
pub use handle::BattleHandle;
pub use providers::{AiCrewProvider, CrewProvider};
pub use runtime::{Runtime, RuntimeBuilder, StepOutcome};
