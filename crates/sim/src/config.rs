//! Simulator settings read from the environment.
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Directory holding `rules.toml`, `armory.ron` and `scenarios/`.
    pub data_dir: PathBuf,
    pub scenario: String,
    /// Armory file overriding `data_dir/armory.ron`.
    pub armory: Option<PathBuf>,
    /// Rules file overriding `data_dir/rules.toml`.
    pub rules: Option<PathBuf>,
    /// Rounds played before the battle is called off.
    pub max_rounds: u32,
    /// Print every event as a JSON line on stdout.
    pub emit_events: bool,
}

impl SimConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_DATA_DIR` - content directory (default: `data`)
    /// - `BATTLE_SCENARIO` - scenario name (default: `skirmish`)
    /// - `BATTLE_ARMORY` - armory RON file (default: `$BATTLE_DATA_DIR/armory.ron`)
    /// - `BATTLE_RULES` - rules TOML file (default: `$BATTLE_DATA_DIR/rules.toml`)
    /// - `BATTLE_MAX_ROUNDS` - round limit (default: 12)
    /// - `BATTLE_EMIT_EVENTS` - `true`/`false` (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("BATTLE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(scenario) = env::var("BATTLE_SCENARIO") {
            config.scenario = scenario;
        }
        config.armory = env::var_os("BATTLE_ARMORY").map(PathBuf::from);
        config.rules = env::var_os("BATTLE_RULES").map(PathBuf::from);
        if let Some(rounds) = read_env::<u32>("BATTLE_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }
        if let Some(emit) = read_bool("BATTLE_EMIT_EVENTS") {
            config.emit_events = emit;
        }

        config
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            scenario: "skirmish".to_string(),
            armory: None,
            rules: None,
            max_rounds: 12,
            emit_events: true,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
