//! Armory catalogue loader.

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::env::{
    ArmorDefinition, ArmorySnapshot, ConsumableDefinition, SightDefinition, WeaponDefinition,
    WeaponModDefinition,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Armory catalogue structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmoryCatalog {
    pub weapons: Vec<WeaponDefinition>,
    pub mods: Vec<WeaponModDefinition>,
    pub sights: Vec<SightDefinition>,
    pub armor: Vec<ArmorDefinition>,
    pub consumables: Vec<ConsumableDefinition>,
}

impl ArmoryCatalog {
    /// Indexes the catalogue by id. Ids must be unique within each section.
    pub fn into_snapshot(self) -> LoadResult<ArmorySnapshot> {
        check_unique("weapon", self.weapons.iter().map(|w| w.id.as_str()))?;
        check_unique("mod", self.mods.iter().map(|m| m.id.as_str()))?;
        check_unique("sight", self.sights.iter().map(|s| s.id.as_str()))?;
        check_unique("armor", self.armor.iter().map(|a| a.id.as_str()))?;
        check_unique("consumable", self.consumables.iter().map(|c| c.id.as_str()))?;

        let mut snapshot = ArmorySnapshot::new();
        snapshot = self.weapons.into_iter().fold(snapshot, ArmorySnapshot::with_weapon);
        snapshot = self.mods.into_iter().fold(snapshot, ArmorySnapshot::with_mod);
        snapshot = self.sights.into_iter().fold(snapshot, ArmorySnapshot::with_sight);
        snapshot = self.armor.into_iter().fold(snapshot, ArmorySnapshot::with_armor);
        snapshot = self
            .consumables
            .into_iter()
            .fold(snapshot, ArmorySnapshot::with_consumable);
        Ok(snapshot)
    }
}

fn check_unique<'a>(section: &str, ids: impl Iterator<Item = &'a str>) -> LoadResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            anyhow::bail!("Duplicate {} id '{}' in armory catalogue", section, id);
        }
    }
    Ok(())
}

/// Loader for the armory catalogue from RON files.
pub struct ArmoryLoader;

impl ArmoryLoader {
    pub fn load(path: &Path) -> LoadResult<ArmorySnapshot> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ArmorySnapshot> {
        let catalog: ArmoryCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse armory RON: {}", e))?;
        let snapshot = catalog.into_snapshot()?;
        tracing::debug!(entries = snapshot.len(), "armory loaded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::env::{
        ArmoryOracle, ConsumableEffect, WeaponRange, WeaponTraits, resolve_weapon,
    };

    const CATALOGUE: &str = r#"(
        weapons: [
            (id: "rifle", name: "Military Rifle", range: cells(24), shots: 1, damage: 0),
            (id: "blade", name: "Blade", range: brawl, shots: 0, damage: 0, traits: "MELEE | ELEGANT"),
        ],
        mods: [
            (id: "hot_shot", delta: (damage: 1)),
        ],
        armor: [
            (id: "combat_armor", save: Some(5), toughness_bonus: 1),
        ],
        consumables: [
            (id: "booster", effect: stat_boost(stat: Speed, bonus: 2, rounds: 1)),
        ],
    )"#;

    #[test]
    fn parses_every_section() {
        let armory = ArmoryLoader::parse(CATALOGUE).expect("valid catalogue");

        let blade = armory.weapon("blade").expect("blade");
        assert_eq!(blade.range, WeaponRange::Brawl);
        assert!(blade.traits.contains(WeaponTraits::MELEE | WeaponTraits::ELEGANT));

        let hot_rifle = resolve_weapon(&armory, "rifle", Some("hot_shot"), None).expect("rifle");
        assert_eq!(hot_rifle.damage, 1);

        assert_eq!(armory.armor("combat_armor").and_then(|a| a.save), Some(5));
        assert!(matches!(
            armory.consumable("booster").map(|c| c.effect),
            Some(ConsumableEffect::StatBoost { bonus: 2, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ArmoryLoader::parse(
            r#"(weapons: [
                (id: "rifle", name: "A", range: cells(24), shots: 1, damage: 0),
                (id: "rifle", name: "B", range: cells(12), shots: 2, damage: 0),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate weapon id 'rifle'"));
    }
}
