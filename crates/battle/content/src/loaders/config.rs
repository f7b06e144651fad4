//! Rule constants loader.

use std::path::Path;

use battle_core::config::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loads [`BattleConfig`] from TOML. Missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_keep_defaults() {
        let config = ConfigLoader::parse(
            r#"
            flee_distance = 4
            hit_target_open = 4
            "#,
        )
        .expect("valid TOML");

        assert_eq!(config.flee_distance, 4);
        assert_eq!(config.hit_target_open, 4);
        assert_eq!(config.follow_up_distance, BattleConfig::DEFAULT_FOLLOW_UP_DISTANCE);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ConfigLoader::parse("flee_distance = \"far\"").is_err());
    }
}
