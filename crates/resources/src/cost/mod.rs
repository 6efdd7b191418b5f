//! Ability cost strategies.
//!
//! Each ability owns one [`CostStrategy`]. The strategy is consulted
//! synchronously before a cast: [`CostStrategy::meets_requirement`] checks
//! affordability and maintains the bar's starvation bookkeeping, then
//! [`CostStrategy::spend`] pays. The instantaneous cost is recomputed from
//! `base * multiplier / 100` at every check so external modifiers apply
//! immediately.

mod mana;
mod rage;

pub use mana::ManaCost;
pub use rage::RageCost;

use crate::bar::ResourceBar;
use combatsim_types::{AbilityId, ResourceError, ResourceType};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Multiplier used when none is configured (percent).
pub const DEFAULT_MULTIPLIER: i32 = 100;

/// Cost parameters shared by every strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellCost {
    /// Ability the cost is attributed to.
    pub ability: AbilityId,
    /// Cost before the multiplier.
    pub base_cost: f64,
    /// Integer percentage; 100 is unmodified.
    pub multiplier: i32,
}

impl SpellCost {
    /// Cost at the current multiplier.
    pub fn current(&self) -> f64 {
        self.base_cost * f64::from(self.multiplier) / 100.0
    }
}

/// Cost behaviour of one resource kind.
pub trait CostStrategy: fmt::Debug + Send + Sync {
    /// Pool this cost draws from.
    fn resource_type(&self) -> ResourceType;

    /// Shared cost parameters.
    fn cost(&self) -> &SpellCost;

    /// Shared cost parameters, mutably.
    fn cost_mut(&mut self) -> &mut SpellCost;

    /// Pay the current cost.
    fn spend(&mut self, now: Duration, bar: &mut ResourceBar) -> Result<(), ResourceError>;

    /// Return part of the last paid cost (e.g. when the ability missed).
    /// Returns the amount actually restored.
    fn issue_refund(&mut self, now: Duration, bar: &mut ResourceBar) -> Result<f64, ResourceError>;

    /// Ability the cost is attributed to.
    fn ability(&self) -> AbilityId {
        self.cost().ability
    }

    /// Instantaneous cost.
    fn current_cost(&self) -> f64 {
        self.cost().current()
    }

    /// Current multiplier (percent).
    fn multiplier(&self) -> i32 {
        self.cost().multiplier
    }

    /// Replace the multiplier.
    fn set_multiplier(&mut self, multiplier: i32) {
        self.cost_mut().multiplier = multiplier;
    }

    /// Adjust the multiplier by `delta` percentage points.
    fn add_multiplier(&mut self, delta: i32) {
        self.cost_mut().multiplier += delta;
    }

    /// Whether the bar can pay the current cost.
    ///
    /// Updates starvation: a failure starts (or continues) an interval, a
    /// success closes any open one. Free abilities never touch starvation.
    fn meets_requirement(&self, now: Duration, bar: &mut ResourceBar) -> bool {
        check_affordable(self.current_cost(), now, bar)
    }

    /// Diagnostic for a failed check. Pure; does not re-check.
    fn insufficient_reason(&self, bar: &ResourceBar) -> String {
        format!(
            "not enough {} (current = {:.3}, cost = {:.3})",
            self.resource_type(),
            bar.current(),
            self.current_cost()
        )
    }
}

/// Affordability check with starvation bookkeeping.
pub(crate) fn check_affordable(cost: f64, now: Duration, bar: &mut ResourceBar) -> bool {
    let affordable = bar.current() >= cost;

    if cost > 0.0 {
        if affordable {
            bar.clear_starved(now);
        } else {
            bar.mark_starved(now, cost);
        }
    }

    affordable
}

/// Declarative cost configuration, tagged by resource kind.
///
/// ```json
/// { "resource": "mana", "base_cost": 0.08 }
/// { "resource": "rage", "cost": 10, "refund": 0.8 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum CostOptions {
    /// Mana cost.
    Mana {
        /// Fraction of the caster's base mana.
        #[serde(default)]
        base_cost: f64,
        /// Flat cost; takes precedence over `base_cost` when positive.
        #[serde(default)]
        flat_cost: f64,
        /// Integer percentage, 100 when unset.
        #[serde(default)]
        multiplier: Option<i32>,
    },
    /// Rage cost.
    Rage {
        /// Flat cost.
        cost: f64,
        /// Fraction of the paid cost returned by a refund.
        #[serde(default)]
        refund: f64,
        /// Integer percentage, 100 when unset.
        #[serde(default)]
        multiplier: Option<i32>,
    },
}

impl CostOptions {
    /// Pool the configured cost draws from.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            CostOptions::Mana { .. } => ResourceType::Mana,
            CostOptions::Rage { .. } => ResourceType::Rage,
        }
    }

    /// Build the strategy for `ability`.
    ///
    /// `base_mana` resolves fractional mana costs and is ignored for rage.
    pub fn build(
        &self,
        ability: AbilityId,
        base_mana: f64,
    ) -> Result<Box<dyn CostStrategy>, ResourceError> {
        let invalid = |reason: String| ResourceError::InvalidCost { ability, reason };

        match *self {
            CostOptions::Mana {
                base_cost,
                flat_cost,
                multiplier,
            } => {
                if base_cost < 0.0 || flat_cost < 0.0 || base_cost.is_nan() || flat_cost.is_nan() {
                    return Err(invalid(format!(
                        "negative mana cost (base_cost = {base_cost}, flat_cost = {flat_cost})"
                    )));
                }
                let base = if flat_cost > 0.0 {
                    flat_cost
                } else {
                    base_cost * base_mana
                };
                Ok(Box::new(ManaCost::new(
                    ability,
                    base,
                    multiplier.unwrap_or(DEFAULT_MULTIPLIER),
                )))
            }
            CostOptions::Rage {
                cost,
                refund,
                multiplier,
            } => {
                if !(cost >= 0.0) {
                    return Err(invalid(format!("negative rage cost ({cost})")));
                }
                if !(0.0..=1.0).contains(&refund) {
                    return Err(invalid(format!("refund {refund} outside 0..=1")));
                }
                Ok(Box::new(
                    RageCost::new(ability, cost, multiplier.unwrap_or(DEFAULT_MULTIPLIER))
                        .with_refund(refund),
                ))
            }
        }
    }
}
