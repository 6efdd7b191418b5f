use super::{CostStrategy, SpellCost};
use crate::bar::ResourceBar;
use combatsim_types::{AbilityId, Cause, ResourceError, ResourceType};
use std::time::Duration;

/// Mana cost. Paying opens (or extends) the bar's active window.
#[derive(Debug, Clone, PartialEq)]
pub struct ManaCost {
    cost: SpellCost,
}

impl ManaCost {
    /// Cost of `base_cost` mana at `multiplier` percent.
    pub fn new(ability: AbilityId, base_cost: f64, multiplier: i32) -> Self {
        Self {
            cost: SpellCost {
                ability,
                base_cost,
                multiplier,
            },
        }
    }
}

impl CostStrategy for ManaCost {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Mana
    }

    fn cost(&self) -> &SpellCost {
        &self.cost
    }

    fn cost_mut(&mut self) -> &mut SpellCost {
        &mut self.cost
    }

    fn spend(&mut self, now: Duration, bar: &mut ResourceBar) -> Result<(), ResourceError> {
        let amount = self.current_cost();
        if amount > 0.0 {
            bar.spend(now, amount, Cause::Ability(self.cost.ability))?;
            bar.refresh_active_window(now);
        }
        Ok(())
    }

    fn issue_refund(&mut self, _now: Duration, _bar: &mut ResourceBar) -> Result<f64, ResourceError> {
        Ok(0.0)
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
    fn test_starvation_ends_on_first_successful_check() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);
        let mut cost = ManaCost::new(AbilityId::new(1), 70.0, DEFAULT_MULTIPLIER);

        // 100 -> spend 60 -> 40
        bar.spend(secs(0), 60.0, Cause::Combat).unwrap();
        assert_eq!(bar.current(), 40.0);

        assert!(!cost.meets_requirement(secs(1), &mut bar));
        assert!(bar.is_starved());
        assert_eq!(bar.starved_since(), Some(secs(1)));
        assert_eq!(bar.starved_waiting_for(), Some(70.0));

        bar.add(secs(3), 50.0, Cause::Combat).unwrap();
        assert_eq!(bar.current(), 90.0);

        assert!(cost.meets_requirement(secs(3), &mut bar));
        assert!(!bar.is_starved());
        assert_eq!(bar.starved_duration(), secs(2));

        cost.spend(secs(3), &mut bar).unwrap();
        assert_eq!(bar.current(), 20.0);
    }

    #[traced_test]
    #[test]
    fn test_starvation_ends_after_gain_clamped_at_max() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);
        let mut cost = ManaCost::new(AbilityId::new(1), 70.0, DEFAULT_MULTIPLIER);

        // 100 -> spend 40 -> 60, short of 70
        bar.spend(secs(0), 40.0, Cause::Combat).unwrap();
        assert!(!cost.meets_requirement(secs(1), &mut bar));
        assert!(bar.is_starved());

        // +50 clamps at max: only 40 applied
        let applied = bar.add(secs(2), 50.0, Cause::Combat).unwrap();
        assert_eq!(applied, 40.0);
        assert_eq!(bar.current(), 100.0);
        let combat = bar.metrics().get(&Cause::Combat).unwrap();
        assert_eq!(combat.total_gained, 40.0);
        assert_eq!(combat.wasted(), 10.0);

        assert!(cost.meets_requirement(secs(2), &mut bar));
        assert!(!bar.is_starved());
        assert_eq!(bar.starved_intervals().len(), 1);
        assert_eq!(bar.starved_duration(), secs(1));

        cost.spend(secs(2), &mut bar).unwrap();
        assert_eq!(bar.current(), 30.0);
    }

    #[traced_test]
    #[test]
    fn test_spend_refreshes_active_window() {
        let mut bar = ResourceBar::mana(ActorId(0), 500.0);
        let mut cost = ManaCost::new(AbilityId::new(2), 50.0, DEFAULT_MULTIPLIER);

        assert!(!bar.in_active_window(secs(1)));
        cost.spend(secs(1), &mut bar).unwrap();
        assert!(bar.in_active_window(secs(5)));
        assert!(!bar.in_active_window(secs(6)));
        assert_eq!(bar.active_window_expires_at(), Some(secs(6)));

        let spent = bar
            .metrics()
            .get(&Cause::Ability(AbilityId::new(2)))
            .unwrap()
            .total_spent;
        assert_eq!(spent, 50.0);
    }

    #[traced_test]
    #[test]
    fn test_free_cast_leaves_window_closed() {
        let mut bar = ResourceBar::mana(ActorId(0), 500.0);
        let mut cost = ManaCost::new(AbilityId::new(3), 0.0, DEFAULT_MULTIPLIER);

        cost.spend(secs(1), &mut bar).unwrap();
        assert!(!bar.in_active_window(secs(2)));
        assert_eq!(cost.issue_refund(secs(1), &mut bar).unwrap(), 0.0);
    }
}
