//! Configuration types for trials.

use crate::outcome::ChanceResolver;
use combatsim_core::SimError;
use combatsim_resources::{StatBlock, DEFAULT_ACTIVE_WINDOW, DEFAULT_REGEN_INTERVAL};
use combatsim_types::time::millis;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for one trial (and every iteration of it).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Simulated length of an iteration, in milliseconds.
    #[serde(with = "millis")]
    pub duration: Duration,

    /// Cadence of the regen action, in milliseconds.
    #[serde(with = "millis")]
    pub regen_interval: Duration,

    /// Active window after a mana spend, in milliseconds.
    #[serde(with = "millis")]
    pub active_window: Duration,

    /// Hit/crit chances used for periodic ticks.
    pub outcomes: ChanceResolver,

    /// Random seed for deterministic simulation.
    pub seed: u64,
}

impl TrialConfig {
    /// Create a configuration for trials of `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            regen_interval: DEFAULT_REGEN_INTERVAL,
            active_window: DEFAULT_ACTIVE_WINDOW,
            outcomes: ChanceResolver::default(),
            seed: 12345,
        }
    }

    /// Set the regen cadence.
    pub fn with_regen_interval(mut self, interval: Duration) -> Self {
        self.regen_interval = interval;
        self
    }

    /// Set the active window length.
    pub fn with_active_window(mut self, window: Duration) -> Self {
        self.active_window = window;
        self
    }

    /// Set the hit/crit chances.
    pub fn with_outcomes(mut self, outcomes: ChanceResolver) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: &str| SimError::InvalidConfig {
            what: "trial".to_string(),
            reason: reason.to_string(),
        };

        if self.duration.is_zero() {
            return Err(invalid("duration must be positive"));
        }
        if self.regen_interval.is_zero() {
            return Err(invalid("regen_interval must be positive"));
        }
        self.outcomes.validate()
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(180))
    }
}

/// Resource pool an actor starts with.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum PoolConfig {
    /// Mana pool starting full.
    Mana {
        /// Maximum mana.
        max: f64,
        /// Base mana that fractional costs are relative to. Defaults to `max`.
        #[serde(default)]
        base: Option<f64>,
    },
    /// Rage pool starting at `start`.
    Rage {
        /// Maximum rage.
        max: f64,
        /// Rage at the start of every iteration.
        #[serde(default)]
        start: f64,
    },
}

/// Configuration of one actor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ActorConfig {
    /// Display name.
    pub name: String,

    /// Regen-relevant stats.
    #[serde(default)]
    pub stats: StatBlock,

    /// Scales snapshot magnitudes of effects this actor applies.
    #[serde(default)]
    pub spell_power: f64,

    /// Resource pools.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

impl ActorConfig {
    /// Actor without pools or stats.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: StatBlock::default(),
            spell_power: 0.0,
            pools: Vec::new(),
        }
    }

    /// Set regen stats.
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    /// Set spell power.
    pub fn with_spell_power(mut self, spell_power: f64) -> Self {
        self.spell_power = spell_power;
        self
    }

    /// Add a mana pool whose base mana equals its maximum.
    pub fn with_mana(mut self, max: f64) -> Self {
        self.pools.push(PoolConfig::Mana { max, base: None });
        self
    }

    /// Add a rage pool.
    pub fn with_rage(mut self, max: f64, start: f64) -> Self {
        self.pools.push(PoolConfig::Rage { max, start });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrialConfig::default();
        assert_eq!(config.regen_interval, Duration::from_secs(2));
        assert_eq!(config.active_window, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TrialConfig =
            serde_json::from_str(r#"{ "duration": 60000, "seed": 7 }"#).unwrap();
        assert_eq!(config, TrialConfig::new(Duration::from_secs(60)).with_seed(7));
    }

    #[test]
    fn test_actor_config_deserialize() {
        let actor: ActorConfig = serde_json::from_str(
            r#"{
                "name": "mage",
                "stats": { "mp5": 20, "spirit": 150 },
                "spell_power": 300,
                "pools": [{ "resource": "mana", "max": 6000, "base": 1500 }]
            }"#,
        )
        .unwrap();

        assert_eq!(actor.stats, StatBlock::new(20.0, 150.0));
        assert_eq!(
            actor.pools,
            vec![PoolConfig::Mana {
                max: 6000.0,
                base: Some(1500.0)
            }]
        );
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let config = TrialConfig::new(Duration::ZERO);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig { .. })));
    }
}
