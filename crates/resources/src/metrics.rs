//! Per-cause resource accounting.

use combatsim_types::Cause;
use indexmap::IndexMap;

/// Accumulated resource changes attributed to one cause.
///
/// Lifetime totals survive iteration resets; the `iteration_*` fields are
/// cleared at the start of every iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMetrics {
    /// Gain actually applied (after clamping at max).
    pub total_gained: f64,
    /// Gain requested before clamping.
    pub total_attempted: f64,
    /// Amount spent.
    pub total_spent: f64,
    /// Number of gain and spend events.
    pub events: u64,
    /// Gain actually applied during the current iteration.
    pub iteration_gain: f64,
    /// Events during the current iteration.
    pub iteration_events: u64,
}

impl ResourceMetrics {
    /// Record a gain of `attempted`, of which `actual` was applied.
    pub fn record_gain(&mut self, attempted: f64, actual: f64) {
        self.total_attempted += attempted;
        self.total_gained += actual;
        self.iteration_gain += actual;
        self.events += 1;
        self.iteration_events += 1;
    }

    /// Record a spend.
    pub fn record_spend(&mut self, amount: f64) {
        self.total_spent += amount;
        self.events += 1;
        self.iteration_events += 1;
    }

    /// Gain lost to clamping at max.
    pub fn wasted(&self) -> f64 {
        self.total_attempted - self.total_gained
    }

    fn reset_iteration(&mut self) {
        self.iteration_gain = 0.0;
        self.iteration_events = 0;
    }
}

/// Metrics for one resource bar, keyed by cause.
///
/// Insertion-ordered so reports list causes in the order they first occurred.
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    by_cause: IndexMap<Cause, ResourceMetrics>,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics for a cause, created on first use.
    pub fn entry(&mut self, cause: Cause) -> &mut ResourceMetrics {
        self.by_cause.entry(cause).or_default()
    }

    /// Metrics for a cause, if it ever produced an event.
    pub fn get(&self, cause: &Cause) -> Option<&ResourceMetrics> {
        self.by_cause.get(cause)
    }

    /// All causes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Cause, &ResourceMetrics)> {
        self.by_cause.iter()
    }

    /// Number of causes tracked.
    pub fn len(&self) -> usize {
        self.by_cause.len()
    }

    /// Whether no cause has been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_cause.is_empty()
    }

    /// Sum of applied gain across causes for the current iteration.
    pub fn iteration_gain(&self) -> f64 {
        self.by_cause.values().map(|m| m.iteration_gain).sum()
    }

    /// Clear per-iteration fields; lifetime totals are kept.
    pub fn reset_iteration(&mut self) {
        for metrics in self.by_cause.values_mut() {
            metrics.reset_iteration();
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.by_cause.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combatsim_types::{AbilityId, RegenPhase};

    #[test]
    fn test_gain_and_spend_accounting() {
        let mut registry = MetricsRegistry::new();
        let regen = Cause::Regen(RegenPhase::WhileIdle);
        let frostbolt = Cause::Ability(AbilityId::new(116));

        registry.entry(regen).record_gain(50.0, 40.0);
        registry.entry(frostbolt).record_spend(25.0);
        registry.entry(regen).record_gain(10.0, 10.0);

        let regen_metrics = registry.get(&regen).unwrap();
        assert_eq!(regen_metrics.total_gained, 50.0);
        assert_eq!(regen_metrics.total_attempted, 60.0);
        assert_eq!(regen_metrics.wasted(), 10.0);
        assert_eq!(regen_metrics.events, 2);

        let order: Vec<_> = registry.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![regen, frostbolt]);
    }

    #[test]
    fn test_iteration_reset_keeps_totals() {
        let mut registry = MetricsRegistry::new();
        let cause = Cause::Combat;

        registry.entry(cause).record_gain(5.0, 5.0);
        assert_eq!(registry.iteration_gain(), 5.0);

        registry.reset_iteration();
        let metrics = registry.get(&cause).unwrap();
        assert_eq!(metrics.iteration_gain, 0.0);
        assert_eq!(metrics.iteration_events, 0);
        assert_eq!(metrics.total_gained, 5.0);
        assert_eq!(metrics.events, 1);
    }
}
