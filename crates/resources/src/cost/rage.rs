use super::{CostStrategy, SpellCost};
use crate::bar::ResourceBar;
use combatsim_types::{AbilityId, Cause, ResourceError, ResourceType};
use std::time::Duration;
use tracing::debug;

/// Rage cost with an optional partial refund of the last paid amount.
#[derive(Debug, Clone, PartialEq)]
pub struct RageCost {
    cost: SpellCost,
    /// Fraction of `last_spent` returned by a refund.
    refund: f64,
    /// Amount paid by the most recent `spend`.
    last_spent: f64,
}

impl RageCost {
    /// Cost of `base_cost` rage at `multiplier` percent, no refund.
    pub fn new(ability: AbilityId, base_cost: f64, multiplier: i32) -> Self {
        Self {
            cost: SpellCost {
                ability,
                base_cost,
                multiplier,
            },
            refund: 0.0,
            last_spent: 0.0,
        }
    }

    /// Set the refund fraction.
    pub fn with_refund(mut self, refund: f64) -> Self {
        self.refund = refund;
        self
    }

    /// Refund fraction.
    pub fn refund(&self) -> f64 {
        self.refund
    }

    /// Amount paid by the most recent spend.
    pub fn last_spent(&self) -> f64 {
        self.last_spent
    }
}

impl CostStrategy for RageCost {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Rage
    }

    fn cost(&self) -> &SpellCost {
        &self.cost
    }

    fn cost_mut(&mut self) -> &mut SpellCost {
        &mut self.cost
    }

    fn spend(&mut self, now: Duration, bar: &mut ResourceBar) -> Result<(), ResourceError> {
        let amount = self.current_cost();
        self.last_spent = amount;
        if amount > 0.0 {
            bar.spend(now, amount, Cause::Ability(self.cost.ability))?;
        }
        Ok(())
    }

    fn issue_refund(&mut self, now: Duration, bar: &mut ResourceBar) -> Result<f64, ResourceError> {
        let amount = self.refund * self.last_spent;
        if amount <= 0.0 {
            return Ok(0.0);
        }

        debug!(ability = %self.cost.ability, amount, "Refunding rage");
        bar.add(now, amount, Cause::Refund(self.cost.ability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::DEFAULT_MULTIPLIER;
    use combatsim_types::ActorId;
    use tracing_test::traced_test;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[traced_test]
    #[test]
    fn test_refund_restores_fraction_of_last_spend() {
        let ability = AbilityId::new(772);
        let mut bar = ResourceBar::rage(ActorId(0), 100.0, 30.0);
        let mut cost = RageCost::new(ability, 10.0, DEFAULT_MULTIPLIER).with_refund(0.8);

        assert!(cost.meets_requirement(secs(0), &mut bar));
        cost.spend(secs(0), &mut bar).unwrap();
        assert_eq!(bar.current(), 20.0);
        assert!(!bar.in_active_window(secs(1)));

        // Multiplier changes after the spend do not affect the refund
        cost.set_multiplier(50);
        assert_eq!(cost.issue_refund(secs(0), &mut bar).unwrap(), 8.0);
        assert_eq!(bar.current(), 28.0);

        let refunded = bar.metrics().get(&Cause::Refund(ability)).unwrap();
        assert_eq!(refunded.total_gained, 8.0);
    }

    #[traced_test]
    #[test]
    fn test_no_refund_configured() {
        let mut bar = ResourceBar::rage(ActorId(0), 100.0, 30.0);
        let mut cost = RageCost::new(AbilityId::new(1), 15.0, DEFAULT_MULTIPLIER);

        cost.spend(secs(0), &mut bar).unwrap();
        assert_eq!(cost.issue_refund(secs(0), &mut bar).unwrap(), 0.0);
        assert_eq!(bar.current(), 15.0);
    }

    #[traced_test]
    #[test]
    fn test_rage_starvation() {
        let mut bar = ResourceBar::rage(ActorId(0), 100.0, 0.0);
        let cost = RageCost::new(AbilityId::new(1), 15.0, DEFAULT_MULTIPLIER);

        assert!(!cost.meets_requirement(secs(1), &mut bar));
        bar.add(secs(4), 20.0, Cause::Combat).unwrap();
        assert!(cost.meets_requirement(secs(4), &mut bar));
        assert_eq!(bar.starved_intervals().len(), 1);
        assert_eq!(bar.starved_duration(), secs(3));
        assert_eq!(bar.first_starved_at(), Some(secs(1)));
    }
}
