use std::env;
use std::time::Duration;

/// Channel sizes, pacing and seeding of a battle runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Requests that may queue before `submit` waits.
    pub command_buffer: usize,
    /// Events kept for slow subscribers before they start lagging.
    pub event_capacity: usize,
    /// Pause after each enemy step so observers can follow the enemy phase.
    pub enemy_step_delay: Duration,
    /// Overrides the seed of the initial state when set.
    pub seed: Option<u64>,
}

impl RuntimeConfig {
    pub const DEFAULT_COMMAND_BUFFER: usize = 32;
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;
    pub const DEFAULT_ENEMY_STEP_DELAY: Duration = Duration::from_millis(250);

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_COMMAND_BUFFER` - queued requests (default: 32, minimum 1)
    /// - `BATTLE_EVENT_CAPACITY` - broadcast capacity (default: 256, minimum 1)
    /// - `BATTLE_ENEMY_STEP_DELAY_MS` - enemy pacing in milliseconds (default: 250)
    /// - `BATTLE_SEED` - dice seed override (default: the scenario's seed)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(buffer) = read_env::<usize>("BATTLE_COMMAND_BUFFER") {
            config.command_buffer = buffer.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_CAPACITY") {
            config.event_capacity = capacity.max(1);
        }
        if let Some(delay) = read_env::<u64>("BATTLE_ENEMY_STEP_DELAY_MS") {
            config.enemy_step_delay = Duration::from_millis(delay);
        }
        config.seed = read_env::<u64>("BATTLE_SEED");

        config
    }

    /// No pacing, for tests and headless runs.
    pub fn unpaced() -> Self {
        Self {
            enemy_step_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_buffer: Self::DEFAULT_COMMAND_BUFFER,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            enemy_step_delay: Self::DEFAULT_ENEMY_STEP_DELAY,
            seed: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaced_keeps_buffers() {
        let config = RuntimeConfig::unpaced();
        assert_eq!(config.enemy_step_delay, Duration::ZERO);
        assert_eq!(config.command_buffer, RuntimeConfig::DEFAULT_COMMAND_BUFFER);
        assert_eq!(config.event_capacity, RuntimeConfig::DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.seed, None);
    }
}
