//! Collaborators consumed by the engine.
//!
//! [`BattleEnv`] bundles the armory, the dice and the mission judge so the
//! rules can reach them without owning concrete implementations.
mod armory;
mod error;
mod mission;
mod rng;

pub use armory::{
    ArmorDefinition, ArmoryOracle, ArmorySnapshot, AttachmentDelta, ConsumableDefinition,
    ConsumableEffect, SightDefinition, WeaponDefinition, WeaponModDefinition, WeaponRange,
    WeaponTraits, resolve_weapon,
};
pub use error::OracleError;
pub use mission::{MissionJudge, ObjectiveMissionJudge};
pub use rng::{Dice, PcgRng, RngOracle, ScriptedRng, compute_seed};

use crate::config::BattleConfig;

static DEFAULT_CONFIG: BattleConfig = BattleConfig::new();

static DEFAULT_JUDGE: ObjectiveMissionJudge = ObjectiveMissionJudge;

/// Read-only collaborators for one resolution.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    armory: Option<&'a dyn ArmoryOracle>,
    rng: Option<&'a dyn RngOracle>,
    judge: Option<&'a dyn MissionJudge>,
    config: Option<&'a BattleConfig>,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        armory: Option<&'a dyn ArmoryOracle>,
        rng: Option<&'a dyn RngOracle>,
        judge: Option<&'a dyn MissionJudge>,
        config: Option<&'a BattleConfig>,
    ) -> Self {
        Self {
            armory,
            rng,
            judge,
            config,
        }
    }

    pub fn with_all(
        armory: &'a dyn ArmoryOracle,
        rng: &'a dyn RngOracle,
        judge: &'a dyn MissionJudge,
        config: &'a BattleConfig,
    ) -> Self {
        Self::new(Some(armory), Some(rng), Some(judge), Some(config))
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None)
    }

    pub fn with_armory(mut self, armory: &'a dyn ArmoryOracle) -> Self {
        self.armory = Some(armory);
        self
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_judge(mut self, judge: &'a dyn MissionJudge) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_config(mut self, config: &'a BattleConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// # Errors
    ///
    /// Returns `OracleError::ArmoryNotAvailable` if no armory was provided.
    pub fn armory(&self) -> Result<&'a dyn ArmoryOracle, OracleError> {
        self.armory.ok_or(OracleError::ArmoryNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no dice were provided.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// The configured judge, or [`ObjectiveMissionJudge`].
    pub fn judge(&self) -> &'a dyn MissionJudge {
        self.judge.unwrap_or(&DEFAULT_JUDGE)
    }

    /// The configured rules, or the defaults.
    pub fn config(&self) -> &'a BattleConfig {
        self.config.unwrap_or(&DEFAULT_CONFIG)
    }
}

impl core::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleEnv")
            .field("armory", &self.armory.is_some())
            .field("rng", &self.rng.is_some())
            .field("judge", &self.judge.is_some())
            .field("config", &self.config)
            .finish()
    }
}
