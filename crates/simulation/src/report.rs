//! Per-trial reports and aggregated statistics.

use crate::state::{CastCounters, DamageTally, TrialState};
use combatsim_resources::StarvedInterval;
use combatsim_types::{AbilityId, ActorId, ResourceType};
use indexmap::IndexMap;
use std::time::Duration;

/// End-of-iteration state of one resource pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceReport {
    /// Owner.
    pub actor: ActorId,
    /// Pool kind.
    pub resource: ResourceType,
    /// Amount left at the end.
    pub final_value: f64,
    /// Applied gain during the iteration.
    pub gained: f64,
    /// Spent during the iteration.
    pub spent: f64,
    /// Total starved time.
    pub starved: Duration,
    /// Starvation intervals, in order.
    pub starved_intervals: Vec<StarvedInterval>,
    /// Start of the first starvation interval.
    pub first_starved_at: Option<Duration>,
}

/// Outcome of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    /// Seed the iteration ran with.
    pub seed: u64,
    /// Simulated length.
    pub duration: Duration,
    /// Scheduler actions fired.
    pub actions_fired: u64,
    /// Damage per ability.
    pub damage_by_ability: IndexMap<AbilityId, DamageTally>,
    /// Total damage.
    pub total_damage: f64,
    /// Cast attempt counters.
    pub casts: CastCounters,
    /// Every resource pool, by actor.
    pub resources: Vec<ResourceReport>,
}

impl TrialReport {
    pub(crate) fn collect(seed: u64, duration: Duration, actions_fired: u64, state: &TrialState) -> Self {
        let resources = state
            .actors()
            .iter()
            .flat_map(|actor| {
                actor.bars().map(move |bar| ResourceReport {
                    actor: actor.id(),
                    resource: bar.resource_type(),
                    final_value: bar.current(),
                    gained: bar.total_gained(),
                    spent: bar.total_spent(),
                    starved: bar.starved_duration(),
                    starved_intervals: bar.starved_intervals().to_vec(),
                    first_starved_at: bar.first_starved_at(),
                })
            })
            .collect();

        Self {
            seed,
            duration,
            actions_fired,
            damage_by_ability: state.damage_by_ability().clone(),
            total_damage: state.total_damage(),
            casts: state.casts(),
            resources,
        }
    }

    /// Damage per simulated second.
    pub fn dps(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_damage / secs
        } else {
            0.0
        }
    }

    /// Pool of `resource` owned by `actor`.
    pub fn resource(&self, actor: ActorId, resource: ResourceType) -> Option<&ResourceReport> {
        self.resources
            .iter()
            .find(|r| r.actor == actor && r.resource == resource)
    }

    /// Starved time summed over every pool.
    pub fn total_starved(&self) -> Duration {
        self.resources.iter().map(|r| r.starved).sum()
    }
}

/// Mean, minimum and maximum of one metric across iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl Summary {
    /// Summarize `values`. All zero when empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self::default();
        }
        Self {
            mean: sum / count as f64,
            min,
            max,
        }
    }
}

/// Statistics aggregated over many iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStats {
    /// Iterations aggregated.
    pub iterations: usize,
    /// Damage per second.
    pub dps: Summary,
    /// Total damage.
    pub total_damage: Summary,
    /// Starved seconds summed over pools.
    pub starved_seconds: Summary,
    /// Iterations in which any pool starved.
    pub starved_iterations: usize,
    /// Cast attempts that could not be afforded, summed.
    pub insufficient_casts: u64,
}

impl SimulationStats {
    /// Aggregate per-iteration reports.
    pub fn from_reports(reports: &[TrialReport]) -> Self {
        Self {
            iterations: reports.len(),
            dps: Summary::from_values(reports.iter().map(|r| r.dps())),
            total_damage: Summary::from_values(reports.iter().map(|r| r.total_damage)),
            starved_seconds: Summary::from_values(
                reports.iter().map(|r| r.total_starved().as_secs_f64()),
            ),
            starved_iterations: reports
                .iter()
                .filter(|r| r.resources.iter().any(|p| p.first_starved_at.is_some()))
                .count(),
            insufficient_casts: reports.iter().map(|r| r.casts.insufficient).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(seed: u64, damage: f64, starved: u64) -> TrialReport {
        let starved = Duration::from_secs(starved);
        TrialReport {
            seed,
            duration: Duration::from_secs(10),
            actions_fired: 0,
            damage_by_ability: IndexMap::new(),
            total_damage: damage,
            casts: CastCounters::default(),
            resources: vec![ResourceReport {
                actor: ActorId(0),
                resource: ResourceType::Mana,
                final_value: 0.0,
                gained: 0.0,
                spent: 0.0,
                starved,
                starved_intervals: Vec::new(),
                first_starved_at: (!starved.is_zero()).then_some(Duration::from_secs(1)),
            }],
        }
    }

    #[test]
    fn test_summary() {
        let summary = Summary::from_values([2.0, 4.0, 9.0]);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(Summary::from_values(std::iter::empty()), Summary::default());
    }

    #[test]
    fn test_stats_from_reports() {
        let stats = SimulationStats::from_reports(&[report(1, 100.0, 0), report(2, 300.0, 4)]);

        assert_eq!(stats.iterations, 2);
        assert_eq!(stats.dps.mean, 20.0);
        assert_eq!(stats.total_damage.max, 300.0);
        assert_eq!(stats.starved_seconds.mean, 2.0);
        assert_eq!(stats.starved_iterations, 1);
    }
}
