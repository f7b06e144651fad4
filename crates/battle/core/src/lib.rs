//! Deterministic rules of a squad-level, turn-based tactical battle.
//!
//! `battle-core` owns the canonical [`BattleState`] and every rule that reads
//! or changes it: grid geometry, line of sight and cover, the participant stat
//! model, the round/phase machine and action resolution. All mutation flows
//! through [`engine::BattleEngine`]; reference data, dice and mission
//! evaluation are injected through [`env::BattleEnv`].
pub mod action;
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod geometry;
pub mod rules;
pub mod setup;
pub mod state;
pub mod stats;
pub mod visibility;

pub use action::{ActionError, ActionKind, ActionRequest, ActionTransition, ShotMode};
pub use ai::{ClosestTargetAi, EnemyDecider};
pub use config::BattleConfig;
pub use engine::{
    ActionReport, BattleEngine, ExecuteError, MAX_ENEMY_STEPS, TransitionPhase,
    TransitionPhaseError,
};
pub use env::{
    ArmorDefinition, ArmoryOracle, ArmorySnapshot, BattleEnv, ConsumableDefinition,
    ConsumableEffect, MissionJudge, ObjectiveMissionJudge, OracleError, PcgRng, RngOracle,
    ScriptedRng, SightDefinition, WeaponDefinition, WeaponModDefinition, WeaponRange,
    WeaponTraits,
};
pub use error::{ErrorSeverity, GameError};
pub use geometry::{BattleGeometry, ReachableCells, find_path, find_reachable_cells};
pub use rules::{
    available_actions, get_effective_weapon, get_valid_shoot_targets, is_engaged, is_opponent,
    movement_options,
};
pub use setup::{BattleSetup, SetupError};
pub use state::{
    ActiveEffect, BattleLog, BattlePhase, BattleState, EffectDuration, EffectKind, GridSize,
    LogEntry, LogParam, Mission, MissionStatus, MultiplayerRole, Objective, ObjectiveKind,
    Participant, ParticipantId, ParticipantStatus, Position, RollingSide, SpecialAbility,
    Terrain, TerrainKind, WeaponInstance, WorldTrait,
};
pub use stats::{StatContext, StatKind, Stats, calculate_effective_stats};
pub use visibility::{calculate_cover, has_line_of_sight};
