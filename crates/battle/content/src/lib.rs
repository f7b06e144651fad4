//! Data-driven battle content and its loaders.
//!
//! Reference data (the armory catalogue), rule tuning and scenario layouts
//! live in RON/TOML files and are turned into `battle-core` types here:
//! - Armory catalogue (RON) into an [`battle_core::env::ArmorySnapshot`]
//! - Rule constants (TOML) into a [`battle_core::config::BattleConfig`]
//! - Scenarios (RON) into a [`battle_core::setup::BattleSetup`]
//!
//! Content feeds oracles and setup; it never appears in battle state itself.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ArmoryCatalog, ArmoryLoader, ConfigLoader, ContentFactory, LoadResult, ParticipantSpec,
    ScenarioLoader, ScenarioSpec,
};
