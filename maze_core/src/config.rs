use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens after a level ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Progression {
    /// Next level on a win, same level again on a loss, stop after the last
    /// level is won.
    #[default]
    Campaign,
    /// Same level again on a loss, stop after the first win.
    SingleLevel,
}

/// Timing and gameplay settings shared by the session and the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum time between two ticks.
    pub tick_interval_ms: u64,
    /// How long a win or loss message stays up.
    pub outcome_pause_ms: u64,
    /// How long the level banner stays up after loading.
    pub level_intro_ms: u64,
    /// Seed for object placement. A fresh random seed is drawn when absent.
    pub seed: Option<u64>,
    pub progression: Progression,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tick_interval_ms: 100,
            outcome_pause_ms: 2000,
            level_intro_ms: 1000,
            seed: None,
            progression: Progression::Campaign,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn outcome_pause(&self) -> Duration {
        Duration::from_millis(self.outcome_pause_ms)
    }

    pub fn level_intro(&self) -> Duration {
        Duration::from_millis(self.level_intro_ms)
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// No pauses at all. Handy for headless runs.
    pub fn instant() -> Self {
        GameConfig {
            tick_interval_ms: 0,
            outcome_pause_ms: 0,
            level_intro_ms: 0,
            ..GameConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_pacing() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.outcome_pause(), Duration::from_secs(2));
        assert_eq!(config.level_intro(), Duration::from_secs(1));
        assert_eq!(config.progression, Progression::Campaign);
    }

    #[test]
    fn configured_seed_is_kept() {
        let config = GameConfig {
            seed: Some(9),
            ..GameConfig::default()
        };
        assert_eq!(config.resolve_seed(), 9);
    }

    #[test]
    fn instant_has_no_delays() {
        let config = GameConfig::instant();
        assert!(config.tick_interval().is_zero());
        assert!(config.outcome_pause().is_zero());
        assert!(config.level_intro().is_zero());
    }
}
