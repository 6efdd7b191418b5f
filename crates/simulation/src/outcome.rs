//! Hit/crit resolution.

use combatsim_core::SimError;
use combatsim_types::HitOutcome;
use rand::{Rng, RngCore};
use serde::Deserialize;
use std::fmt;

/// Rolls hit/miss/crit and scales amounts by the result.
pub trait OutcomeResolver: fmt::Debug {
    /// Roll one outcome.
    fn roll(&self, rng: &mut dyn RngCore) -> HitOutcome;

    /// Amount that lands for `base` under `outcome`.
    fn scale(&self, outcome: HitOutcome, base: f64) -> f64;
}

/// Fixed-chance resolver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChanceResolver {
    /// Probability a roll is not a miss.
    pub hit_chance: f64,
    /// Probability a landed roll is a crit.
    pub crit_chance: f64,
    /// Damage multiplier on crit.
    pub crit_multiplier: f64,
}

impl Default for ChanceResolver {
    fn default() -> Self {
        Self {
            hit_chance: 1.0,
            crit_chance: 0.0,
            crit_multiplier: 1.5,
        }
    }
}

impl ChanceResolver {
    /// Resolver with the given chances and a 1.5 crit multiplier.
    pub fn new(hit_chance: f64, crit_chance: f64) -> Self {
        Self {
            hit_chance,
            crit_chance,
            ..Default::default()
        }
    }

    /// Resolver that always hits and never crits.
    pub fn always_hit() -> Self {
        Self::default()
    }

    /// Reject chances outside 0..=1 and negative multipliers.
    pub fn validate(&self) -> Result<(), SimError> {
        let in_range = |p: f64| (0.0..=1.0).contains(&p);
        if !in_range(self.hit_chance) || !in_range(self.crit_chance) || !(self.crit_multiplier >= 0.0) {
            return Err(SimError::InvalidConfig {
                what: "outcomes".to_string(),
                reason: format!(
                    "hit_chance = {}, crit_chance = {}, crit_multiplier = {}",
                    self.hit_chance, self.crit_chance, self.crit_multiplier
                ),
            });
        }
        Ok(())
    }
}

impl OutcomeResolver for ChanceResolver {
    fn roll(&self, rng: &mut dyn RngCore) -> HitOutcome {
        if rng.gen::<f64>() >= self.hit_chance {
            HitOutcome::Miss
        } else if rng.gen::<f64>() < self.crit_chance {
            HitOutcome::Crit
        } else {
            HitOutcome::Hit
        }
    }

    fn scale(&self, outcome: HitOutcome, base: f64) -> f64 {
        match outcome {
            HitOutcome::Miss => 0.0,
            HitOutcome::Hit => base,
            HitOutcome::Crit => base * self.crit_multiplier,
        }
    }
}
