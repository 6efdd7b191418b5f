//! Out-of-resource ("starved") interval tracking.

use std::time::Duration;
use tracing::debug;

/// One closed starvation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarvedInterval {
    /// First failed affordability check.
    pub start: Duration,
    /// First successful check afterwards, or the iteration end.
    pub end: Duration,
}

impl StarvedInterval {
    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Tracks when an actor could not afford an ability.
///
/// Starvation begins at the first failed check and ends at the next
/// successful one. While starved, further failures never move the start
/// time; only the smallest outstanding requirement is kept.
#[derive(Debug, Clone, Default)]
pub struct Starvation {
    /// Smallest cost that failed during the open interval.
    waiting_for: Option<f64>,
    /// Start of the open interval.
    since: Option<Duration>,
    /// Closed intervals, in order. Never overlapping.
    intervals: Vec<StarvedInterval>,
    /// Sum of closed interval lengths.
    total: Duration,
    /// Number of intervals opened.
    events: u32,
}

impl Starvation {
    /// Create a tracker with no recorded starvation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interval is open.
    pub fn is_starved(&self) -> bool {
        self.since.is_some()
    }

    /// Start of the open interval.
    pub fn since(&self) -> Option<Duration> {
        self.since
    }

    /// Smallest requirement that failed during the open interval.
    pub fn outstanding(&self) -> Option<f64> {
        self.waiting_for
    }

    /// Record a failed affordability check.
    pub fn mark(&mut self, now: Duration, required: f64) {
        match self.waiting_for {
            Some(waiting) => {
                // Continuation: keep the original start time
                self.waiting_for = Some(waiting.min(required));
            }
            None => {
                self.waiting_for = Some(required);
                self.since = Some(now);
                self.events += 1;
                debug!(at = ?now, required, "Starvation started");
            }
        }
    }

    /// Record a successful affordability check.
    ///
    /// Returns the length of the interval that just closed, if any.
    pub fn clear(&mut self, now: Duration) -> Option<Duration> {
        let start = self.since.take()?;
        self.waiting_for = None;

        let interval = StarvedInterval { start, end: now };
        let elapsed = interval.duration();
        self.intervals.push(interval);
        self.total += elapsed;
        debug!(at = ?now, elapsed = ?elapsed, "Starvation ended");
        Some(elapsed)
    }

    /// Total closed starvation time.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Closed intervals in order.
    pub fn intervals(&self) -> &[StarvedInterval] {
        &self.intervals
    }

    /// Number of intervals opened.
    pub fn events(&self) -> u32 {
        self.events
    }

    /// Start of the first interval, if any.
    pub fn first_at(&self) -> Option<Duration> {
        self.intervals.first().map(|i| i.start).or(self.since)
    }

    /// Forget everything for a new iteration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[traced_test]
    #[test]
    fn test_continuation_keeps_start_and_minimum() {
        let mut starvation = Starvation::new();

        starvation.mark(secs(2), 70.0);
        starvation.mark(secs(3), 120.0);
        starvation.mark(secs(4), 30.0);

        assert!(starvation.is_starved());
        assert_eq!(starvation.since(), Some(secs(2)));
        assert_eq!(starvation.outstanding(), Some(30.0));
        assert_eq!(starvation.events(), 1);

        assert_eq!(starvation.clear(secs(9)), Some(secs(7)));
        assert!(!starvation.is_starved());
        assert_eq!(starvation.outstanding(), None);
    }

    #[traced_test]
    #[test]
    fn test_total_is_sum_of_disjoint_intervals() {
        let mut starvation = Starvation::new();

        starvation.mark(secs(1), 10.0);
        starvation.clear(secs(3));
        // Clearing while not starved is a no-op
        assert_eq!(starvation.clear(secs(4)), None);
        starvation.mark(secs(5), 10.0);
        starvation.clear(secs(10));

        let intervals = starvation.intervals();
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].end <= intervals[1].start);

        let sum: Duration = intervals.iter().map(|i| i.duration()).sum();
        assert_eq!(starvation.total(), sum);
        assert_eq!(starvation.total(), secs(7));
        assert_eq!(starvation.events(), 2);
        assert_eq!(starvation.first_at(), Some(secs(1)));
    }
}
