//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use battle_core::config::BattleConfig;
use battle_core::env::ArmorySnapshot;

use crate::loaders::{ArmoryLoader, ConfigLoader, LoadResult, ScenarioLoader, ScenarioSpec};

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── rules.toml
/// ├── armory.ron
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Rule constants from `rules.toml`, or the defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("rules.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no rules file, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Armory catalogue from `armory.ron`.
    pub fn load_armory(&self) -> LoadResult<ArmorySnapshot> {
        ArmoryLoader::load(&self.data_dir.join("armory.ron"))
    }

    /// Scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioSpec> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::env::ArmoryOracle;

    #[test]
    fn loads_from_a_data_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("rules.toml"), "console_target = 4\n").expect("write rules");
        std::fs::write(
            dir.path().join("armory.ron"),
            r#"(weapons: [(id: "pistol", name: "Hand Gun", range: cells(9), shots: 1, damage: 0, traits: "PISTOL")])"#,
        )
        .expect("write armory");
        std::fs::create_dir(dir.path().join("scenarios")).expect("scenario dir");
        std::fs::write(
            dir.path().join("scenarios").join("duel.ron"),
            r#"(
                grid: (width: 4, height: 4),
                participants: [
                    (id: "c1", name: "Ada", kind: Character(xp: 0), position: (x: 0, y: 0),
                     stats: (reactions: 1, speed: 4, combat: 0, toughness: 3, savvy: 0, luck: 0)),
                ],
            )"#,
        )
        .expect("write scenario");

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().expect("rules").console_target, 4);
        assert!(factory.load_armory().expect("armory").weapon("pistol").is_some());
        assert_eq!(factory.load_scenario("duel").expect("scenario").participants.len(), 1);
        assert!(factory.load_scenario("missing").is_err());
    }

    #[test]
    fn missing_rules_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().expect("defaults"), BattleConfig::default());
    }
}
