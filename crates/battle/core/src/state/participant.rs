//! Combatants taking part in a battle.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use bitflags::bitflags;
use tracing::warn;

use super::{ActiveEffects, ParticipantId, Position};
use crate::config::BattleConfig;
use crate::stats::Stats;

/// Discriminator shared by both participant variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ParticipantType {
    Character,
    Enemy,
}

/// Variant-specific data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticipantKind {
    Character { xp: u32 },
    Enemy { ai_template: String },
}

impl ParticipantKind {
    pub fn participant_type(&self) -> ParticipantType {
        match self {
            ParticipantKind::Character { .. } => ParticipantType::Character,
            ParticipantKind::Enemy { .. } => ParticipantType::Enemy,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ParticipantStatus {
    #[default]
    Active,
    Stunned,
    Dazed,
    Casualty,
}

/// Ability tags that alter the action rules.
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
pub enum SpecialAbility {
    /// May take a second combat action each turn.
    DoubleAction,
    /// Must brawl whenever engaged.
    MustBrawl,
    Teleporter,
    /// Cannot use consumables.
    Bot,
    /// Seizing the initiative carries no penalty.
    Tactician,
    /// Surviving victims become terrified.
    Terrifying,
    /// Immune to terror.
    Fearless,
}

bitflags! {
    /// Action types already used by a participant this turn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionsTaken: u8 {
        const MOVE     = 1 << 0;
        const DASH     = 1 << 1;
        const COMBAT   = 1 << 2;
        const INTERACT = 1 << 3;
    }
}

impl ActionsTaken {
    pub fn has_moved(self) -> bool {
        self.intersects(Self::MOVE | Self::DASH)
    }
}

/// Reference to a weapon carried by a participant, with optional attachments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponInstance {
    pub instance_id: String,
    pub weapon_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mod_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sight_id: Option<String>,
}

impl WeaponInstance {
    pub fn new(instance_id: impl Into<String>, weapon_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            weapon_id: weapon_id.into(),
            mod_id: None,
            sight_id: None,
        }
    }

    pub fn with_mod(mut self, mod_id: impl Into<String>) -> Self {
        self.mod_id = Some(mod_id.into());
        self
    }

    pub fn with_sight(mut self, sight_id: impl Into<String>) -> Self {
        self.sight_id = Some(sight_id.into());
        self
    }
}

pub type WeaponSlots = ArrayVec<WeaponInstance, { BattleConfig::MAX_WEAPONS }>;

/// A character or enemy on the battle grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    pub position: Position,
    pub stats: Stats,
    pub current_luck: i32,
    pub actions_remaining: u8,
    pub actions_taken: ActionsTaken,
    pub combat_actions_taken: u8,
    pub consumables_used_this_turn: u8,
    pub weapons: WeaponSlots,
    pub armor: Option<String>,
    pub screen: Option<String>,
    pub inoperable_weapons: BTreeSet<String>,
    pub consumables: Vec<String>,
    pub special_abilities: BTreeSet<SpecialAbility>,
    pub active_effects: ActiveEffects,
    pub status: ParticipantStatus,
    pub stun_tokens: u8,
    /// Objective item currently carried.
    pub carrying: Option<String>,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        kind: ParticipantKind,
        position: Position,
        stats: Stats,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            position,
            stats,
            current_luck: stats.luck,
            actions_remaining: BattleConfig::MAX_ACTIONS,
            actions_taken: ActionsTaken::empty(),
            combat_actions_taken: 0,
            consumables_used_this_turn: 0,
            weapons: WeaponSlots::new(),
            armor: None,
            screen: None,
            inoperable_weapons: BTreeSet::new(),
            consumables: Vec::new(),
            special_abilities: BTreeSet::new(),
            active_effects: ActiveEffects::new(),
            status: ParticipantStatus::Active,
            stun_tokens: 0,
            carrying: None,
        }
    }

    pub fn character(
        id: &str,
        name: impl Into<String>,
        position: Position,
        stats: Stats,
    ) -> Self {
        Self::new(id, name, ParticipantKind::Character { xp: 0 }, position, stats)
    }

    pub fn enemy(
        id: &str,
        name: impl Into<String>,
        ai_template: impl Into<String>,
        position: Position,
        stats: Stats,
    ) -> Self {
        let kind = ParticipantKind::Enemy {
            ai_template: ai_template.into(),
        };
        Self::new(id, name, kind, position, stats)
    }

    /// Adds a weapon to the next free slot.
    ///
    /// Debug builds panic when every slot is taken; release builds drop the
    /// weapon with a warning.
    pub fn with_weapon(mut self, weapon: WeaponInstance) -> Self {
        let free = !self.weapons.is_full();
        debug_assert!(free, "{} has no free weapon slot", self.id);
        if free {
            self.weapons.push(weapon);
        } else {
            warn!(
                participant = %self.id,
                weapon = %weapon.instance_id,
                "no free weapon slot, weapon dropped"
            );
        }
        self
    }

    pub fn with_ability(mut self, ability: SpecialAbility) -> Self {
        self.special_abilities.insert(ability);
        self
    }

    pub fn participant_type(&self) -> ParticipantType {
        self.kind.participant_type()
    }

    pub fn is_casualty(&self) -> bool {
        self.status == ParticipantStatus::Casualty
    }

    pub fn has_ability(&self, ability: SpecialAbility) -> bool {
        self.special_abilities.contains(&ability)
    }

    pub fn weapon(&self, instance_id: &str) -> Option<&WeaponInstance> {
        self.weapons.iter().find(|w| w.instance_id == instance_id)
    }

    /// Resets the per-turn action economy at the start of a round.
    pub fn reset_actions(&mut self) {
        self.actions_remaining = match self.status {
            ParticipantStatus::Casualty => 0,
            ParticipantStatus::Stunned | ParticipantStatus::Dazed => 1,
            ParticipantStatus::Active => BattleConfig::MAX_ACTIONS,
        };
        self.actions_taken = ActionsTaken::empty();
        self.combat_actions_taken = 0;
        self.consumables_used_this_turn = 0;
    }

    /// Marks the participant as out of the fight.
    pub fn mark_casualty(&mut self) {
        self.status = ParticipantStatus::Casualty;
        self.actions_remaining = 0;
        self.stun_tokens = 0;
    }

    pub fn add_stun(&mut self) {
        self.stun_tokens = self.stun_tokens.saturating_add(1);
        self.status = ParticipantStatus::Stunned;
        self.actions_remaining = self.actions_remaining.min(1);
    }

    pub fn daze(&mut self) {
        if self.status == ParticipantStatus::Active {
            self.status = ParticipantStatus::Dazed;
        }
        self.actions_remaining = self.actions_remaining.min(1);
    }

    pub fn spend_actions(&mut self, count: u8) {
        self.actions_remaining = self.actions_remaining.saturating_sub(count);
    }
}
