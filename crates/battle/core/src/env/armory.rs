//! Reference data for weapons, attachments, armor and consumables.
//!
//! Definitions are owned by the armory, never by participants. A participant
//! only carries ids, and the effective weapon is derived on demand.

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::stats::StatKind;

/// Read-only lookup of armory definitions by id.
///
/// Unknown ids return `None`; callers treat them as "not available".
pub trait ArmoryOracle: Send + Sync {
    fn weapon(&self, id: &str) -> Option<WeaponDefinition>;
    fn weapon_mod(&self, id: &str) -> Option<WeaponModDefinition>;
    fn sight(&self, id: &str) -> Option<SightDefinition>;
    /// Armor and screens share one table.
    fn armor(&self, id: &str) -> Option<ArmorDefinition>;
    fn consumable(&self, id: &str) -> Option<ConsumableDefinition>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeaponRange {
    /// Usable only in close combat.
    Brawl,
    Cells(u32),
}

impl WeaponRange {
    pub fn cells(self) -> Option<u32> {
        match self {
            WeaponRange::Brawl => None,
            WeaponRange::Cells(n) => Some(n),
        }
    }

    /// Half the range, rounded up.
    pub fn short(self) -> Option<u32> {
        self.cells().map(|n| n.div_ceil(2))
    }

    fn adjusted(self, delta: i32) -> Self {
        match self {
            WeaponRange::Brawl => WeaponRange::Brawl,
            WeaponRange::Cells(n) => WeaponRange::Cells(n.saturating_add_signed(delta)),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WeaponTraits: u16 {
        const MELEE     = 1 << 0;
        const PISTOL    = 1 << 1;
        const HEAVY     = 1 << 2;
        /// +1 to hit on snap shots.
        const SNAP_SHOT = 1 << 3;
        /// -1 in brawls.
        const CLUMSY    = 1 << 4;
        /// Rerolls a natural 1 in brawls.
        const ELEGANT   = 1 << 5;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponDefinition {
    pub id: String,
    pub name: String,
    pub range: WeaponRange,
    pub shots: u32,
    pub damage: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: WeaponTraits,
}

impl WeaponDefinition {
    pub fn new(id: impl Into<String>, range: WeaponRange, shots: u32, damage: i32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            range,
            shots,
            damage,
            traits: WeaponTraits::empty(),
        }
    }

    pub fn with_traits(mut self, traits: WeaponTraits) -> Self {
        self.traits |= traits;
        self
    }

    pub fn is_melee(&self) -> bool {
        self.traits.contains(WeaponTraits::MELEE) || self.range == WeaponRange::Brawl
    }

    /// Bonus added to brawl rolls.
    pub fn brawl_bonus(&self) -> i32 {
        if self.is_melee() {
            2
        } else if self.traits.contains(WeaponTraits::PISTOL) {
            1
        } else {
            0
        }
    }

    pub fn can_shoot(&self) -> bool {
        self.range != WeaponRange::Brawl && self.shots > 0
    }

    /// Applies an attachment's deltas, returning a new definition.
    fn adjusted(mut self, delta: &AttachmentDelta) -> Self {
        self.range = self.range.adjusted(delta.range);
        self.damage += delta.damage;
        self.shots = self.shots.saturating_add_signed(delta.shots);
        self.traits |= delta.traits;
        self
    }
}

/// Stat deltas contributed by a mod or a sight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttachmentDelta {
    pub range: i32,
    pub damage: i32,
    pub shots: i32,
    pub traits: WeaponTraits,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponModDefinition {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delta: AttachmentDelta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SightDefinition {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delta: AttachmentDelta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorDefinition {
    pub id: String,
    /// Saving throw: a d6 at or above this value negates a hit.
    pub save: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub toughness_bonus: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed_bonus: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConsumableEffect {
    /// Temporary flat stat bonus.
    StatBoost { stat: StatKind, bonus: i32, rounds: u32 },
    /// Clears stun tokens and the dazed status.
    Recover,
    /// Removes terror and suppression.
    Steady,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumableDefinition {
    pub id: String,
    pub effect: ConsumableEffect,
}

/// Merges base weapon data with the instance's attachments.
pub fn resolve_weapon(
    armory: &dyn ArmoryOracle,
    weapon_id: &str,
    mod_id: Option<&str>,
    sight_id: Option<&str>,
) -> Option<WeaponDefinition> {
    let mut weapon = armory.weapon(weapon_id)?;
    if let Some(m) = mod_id.and_then(|id| armory.weapon_mod(id)) {
        weapon = weapon.adjusted(&m.delta);
    }
    if let Some(s) = sight_id.and_then(|id| armory.sight(id)) {
        weapon = weapon.adjusted(&s.delta);
    }
    Some(weapon)
}

/// In-memory armory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmorySnapshot {
    pub weapons: BTreeMap<String, WeaponDefinition>,
    pub mods: BTreeMap<String, WeaponModDefinition>,
    pub sights: BTreeMap<String, SightDefinition>,
    pub armor: BTreeMap<String, ArmorDefinition>,
    pub consumables: BTreeMap<String, ConsumableDefinition>,
}

impl ArmorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weapon(mut self, weapon: WeaponDefinition) -> Self {
        self.weapons.insert(weapon.id.clone(), weapon);
        self
    }

    pub fn with_mod(mut self, weapon_mod: WeaponModDefinition) -> Self {
        self.mods.insert(weapon_mod.id.clone(), weapon_mod);
        self
    }

    pub fn with_sight(mut self, sight: SightDefinition) -> Self {
        self.sights.insert(sight.id.clone(), sight);
        self
    }

    pub fn with_armor(mut self, armor: ArmorDefinition) -> Self {
        self.armor.insert(armor.id.clone(), armor);
        self
    }

    pub fn with_consumable(mut self, consumable: ConsumableDefinition) -> Self {
        self.consumables.insert(consumable.id.clone(), consumable);
        self
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
            + self.mods.len()
            + self.sights.len()
            + self.armor.len()
            + self.consumables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArmoryOracle for ArmorySnapshot {
    fn weapon(&self, id: &str) -> Option<WeaponDefinition> {
        self.weapons.get(id).cloned()
    }

    fn weapon_mod(&self, id: &str) -> Option<WeaponModDefinition> {
        self.mods.get(id).cloned()
    }

    fn sight(&self, id: &str) -> Option<SightDefinition> {
        self.sights.get(id).cloned()
    }

    fn armor(&self, id: &str) -> Option<ArmorDefinition> {
        self.armor.get(id).cloned()
    }

    fn consumable(&self, id: &str) -> Option<ConsumableDefinition> {
        self.consumables.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armory() -> ArmorySnapshot {
        ArmorySnapshot::new()
            .with_weapon(WeaponDefinition::new("rifle", WeaponRange::Cells(12), 1, 1))
            .with_weapon(
                WeaponDefinition::new("blade", WeaponRange::Brawl, 0, 1)
                    .with_traits(WeaponTraits::MELEE | WeaponTraits::ELEGANT),
            )
            .with_mod(WeaponModDefinition {
                id: "barrel".into(),
                delta: AttachmentDelta {
                    range: 2,
                    ..AttachmentDelta::default()
                },
            })
            .with_sight(SightDefinition {
                id: "laser".into(),
                delta: AttachmentDelta {
                    traits: WeaponTraits::SNAP_SHOT,
                    ..AttachmentDelta::default()
                },
            })
    }

    #[test]
    fn attachments_adjust_a_copy() {
        let armory = armory();
        let weapon = resolve_weapon(&armory, "rifle", Some("barrel"), Some("laser"))
            .expect("rifle exists");
        assert_eq!(weapon.range, WeaponRange::Cells(14));
        assert!(weapon.traits.contains(WeaponTraits::SNAP_SHOT));
        assert_eq!(armory.weapon("rifle").map(|w| w.range), Some(WeaponRange::Cells(12)));
    }

    #[test]
    fn unknown_attachments_are_ignored() {
        let armory = armory();
        let weapon = resolve_weapon(&armory, "rifle", Some("nope"), None).expect("rifle exists");
        assert_eq!(weapon.range, WeaponRange::Cells(12));
        assert!(resolve_weapon(&armory, "missing", None, None).is_none());
    }

    #[test]
    fn brawl_bonus_by_weapon_class() {
        let armory = armory();
        assert_eq!(armory.weapon("blade").map(|w| w.brawl_bonus()), Some(2));
        assert_eq!(armory.weapon("rifle").map(|w| w.brawl_bonus()), Some(0));
        let pistol = WeaponDefinition::new("pistol", WeaponRange::Cells(6), 1, 0)
            .with_traits(WeaponTraits::PISTOL);
        assert_eq!(pistol.brawl_bonus(), 1);
    }

    #[test]
    fn short_range_rounds_up() {
        assert_eq!(WeaponRange::Cells(9).short(), Some(5));
        assert_eq!(WeaponRange::Cells(12).short(), Some(6));
        assert_eq!(WeaponRange::Brawl.short(), None);
    }
}
