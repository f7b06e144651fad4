//! Canonical battle state.
//!
//! [`BattleState`] is the aggregate root. Only the engine mutates it; every
//! other consumer reads clones or shared snapshots.

mod common;
mod effects;
mod log;
mod mission;
mod participant;
mod phase;
mod terrain;

use std::collections::{BTreeMap, BTreeSet};

pub use common::{GridSize, MultiplayerRole, ParticipantId, Position, Side};
pub use effects::{
    ActiveEffect, ActiveEffects, EffectDuration, EffectKind, ModifierScope, TERRIFYING,
};
pub use log::{BattleLog, LogEntry, LogParam};
pub use mission::{Mission, MissionKind, MissionStatus, Objective, ObjectiveKind};
pub use participant::{
    ActionsTaken, Participant, ParticipantKind, ParticipantStatus, ParticipantType,
    SpecialAbility, WeaponInstance, WeaponSlots,
};
pub use phase::{BattlePhase, FollowUpState, ReactionRoll, RollingSide};
pub use terrain::{CoverHeight, Terrain, TerrainKind};

use crate::geometry::BattleGeometry;

/// Global modifiers that switch rules on or off for the whole battle.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WorldTrait {
    /// Ice sheets: slide movement becomes available.
    Frozen,
    /// Teleportation is impossible.
    NullZone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub grid: GridSize,
    pub terrain: Vec<Terrain>,
    pub participants: Vec<Participant>,
    pub mission: Mission,
    pub phase: BattlePhase,
    pub round: u32,
    pub active_participant_id: Option<ParticipantId>,
    pub quick_action_order: Vec<ParticipantId>,
    pub slow_action_order: Vec<ParticipantId>,
    pub enemy_turn_order: Vec<ParticipantId>,
    /// Index into the order of the current activation phase.
    pub order_cursor: usize,
    pub follow_up_state: Option<FollowUpState>,
    pub reaction_rolls: BTreeMap<ParticipantId, ReactionRoll>,
    pub log: BattleLog,
    pub deployment_condition: Option<String>,
    pub world_traits: BTreeSet<WorldTrait>,
    pub multiplayer_role: Option<MultiplayerRole>,
    pub story_points: BTreeMap<RollingSide, u32>,
    pub initiative_seized: BTreeSet<RollingSide>,
    /// Base seed mixed into every dice roll.
    pub seed: u64,
    /// Number of resolved requests. Advances the dice stream.
    pub nonce: u64,
}

impl BattleState {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            terrain: Vec::new(),
            participants: Vec::new(),
            mission: Mission::default(),
            phase: BattlePhase::ReactionRoll,
            round: 1,
            active_participant_id: None,
            quick_action_order: Vec::new(),
            slow_action_order: Vec::new(),
            enemy_turn_order: Vec::new(),
            order_cursor: 0,
            follow_up_state: None,
            reaction_rolls: BTreeMap::new(),
            log: BattleLog::default(),
            deployment_condition: None,
            world_traits: BTreeSet::new(),
            multiplayer_role: None,
            story_points: BTreeMap::new(),
            initiative_seized: BTreeSet::new(),
            seed: 0,
            nonce: 0,
        }
    }

    pub fn geometry(&self) -> BattleGeometry<'_> {
        BattleGeometry::new(self.grid, &self.terrain, &self.participants)
    }

    pub fn index_of(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| &p.id == id)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_mut(&mut self, id: &ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    pub fn active_participant(&self) -> Option<&Participant> {
        self.active_participant_id
            .as_ref()
            .and_then(|id| self.participant(id))
    }

    pub fn has_trait(&self, world_trait: WorldTrait) -> bool {
        self.world_traits.contains(&world_trait)
    }

    /// The order consumed by the current activation phase.
    pub fn current_order(&self) -> &[ParticipantId] {
        match self.phase {
            BattlePhase::QuickActions => &self.quick_action_order,
            BattlePhase::SlowActions => &self.slow_action_order,
            BattlePhase::EnemyActions => &self.enemy_turn_order,
            BattlePhase::ReactionRoll | BattlePhase::BattleOver(_) => &[],
        }
    }

    /// Side that rolls initiative for `participant`, or `None` for AI enemies.
    pub fn rolling_side(&self, participant: &Participant) -> Option<RollingSide> {
        match self.multiplayer_role {
            Some(_) => match participant.id.side() {
                Some(Side::Host) => Some(RollingSide::Host),
                Some(Side::Guest) => Some(RollingSide::Guest),
                None => None,
            },
            None => match participant.participant_type() {
                ParticipantType::Character => Some(RollingSide::Crew),
                ParticipantType::Enemy => None,
            },
        }
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}
