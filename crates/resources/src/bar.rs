//! Per-actor resource pool.

use crate::metrics::MetricsRegistry;
use crate::regen::{
    ActiveWindow, RegenRates, RegenSource, DEFAULT_ACTIVE_WINDOW, DEFAULT_REGEN_INTERVAL,
};
use crate::starvation::{StarvedInterval, Starvation};
use combatsim_types::{
    duration_from_seconds, ActorId, Cause, RegenPhase, ResourceError, ResourceType, NEVER,
};
use std::time::Duration;
use tracing::debug;

/// Resource pool of one actor (mana, rage, ...).
///
/// `current` is clamped to `max` on gain but never clamped on spend. Callers
/// check affordability through a cost strategy first.
#[derive(Debug, Clone)]
pub struct ResourceBar {
    /// Owning actor, for diagnostics.
    owner: ActorId,

    /// Pool kind.
    resource: ResourceType,

    /// Current amount.
    current: f64,

    /// Upper bound for gains.
    max: f64,

    /// Amount restored by `reset()`.
    start_value: f64,

    /// Cadence of the regen action.
    regen_interval: Duration,

    /// Per-tick rates computed at the last regen tick.
    last_rates: RegenRates,

    /// Window after a spend with its own regen rate (mana only).
    active_window: Option<ActiveWindow>,

    /// Out-of-resource tracking.
    starvation: Starvation,

    /// Gain/spend accounting by cause.
    metrics: MetricsRegistry,

    /// Applied gain this iteration.
    gained: f64,

    /// Spent this iteration.
    spent: f64,
}

impl ResourceBar {
    /// Create a bar that starts full and has no active window.
    pub fn new(owner: ActorId, resource: ResourceType, max: f64) -> Self {
        Self {
            owner,
            resource,
            current: max,
            max,
            start_value: max,
            regen_interval: DEFAULT_REGEN_INTERVAL,
            last_rates: RegenRates::default(),
            active_window: None,
            starvation: Starvation::new(),
            metrics: MetricsRegistry::new(),
            gained: 0.0,
            spent: 0.0,
        }
    }

    /// Mana bar: starts full, 5 second active window.
    pub fn mana(owner: ActorId, max: f64) -> Self {
        Self::new(owner, ResourceType::Mana, max).with_active_window(DEFAULT_ACTIVE_WINDOW)
    }

    /// Rage bar: starts at `start_value`, grows only through combat.
    pub fn rage(owner: ActorId, max: f64, start_value: f64) -> Self {
        Self::new(owner, ResourceType::Rage, max).with_start_value(start_value)
    }

    /// Set the active window length.
    pub fn with_active_window(mut self, length: Duration) -> Self {
        self.active_window = Some(ActiveWindow::new(length));
        self
    }

    /// Set the value restored by `reset()` (clamped to max).
    pub fn with_start_value(mut self, start_value: f64) -> Self {
        self.start_value = start_value.clamp(0.0, self.max);
        self.current = self.start_value;
        self
    }

    /// Set the regen cadence.
    pub fn with_regen_interval(mut self, interval: Duration) -> Self {
        self.regen_interval = interval;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Owning actor.
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Pool kind.
    pub fn resource_type(&self) -> ResourceType {
        self.resource
    }

    /// Current amount.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Maximum amount.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Current amount as a fraction of max.
    pub fn current_percent(&self) -> f64 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Regen cadence.
    pub fn regen_interval(&self) -> Duration {
        self.regen_interval
    }

    /// Per-tick active rate computed at the last regen tick.
    pub fn regen_per_tick_while_active(&self) -> f64 {
        self.last_rates.while_active
    }

    /// Per-tick idle rate computed at the last regen tick.
    pub fn regen_per_tick_while_idle(&self) -> f64 {
        self.last_rates.while_idle
    }

    /// Gain/spend accounting by cause.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Applied gain this iteration.
    pub fn total_gained(&self) -> f64 {
        self.gained
    }

    /// Spent this iteration.
    pub fn total_spent(&self) -> f64 {
        self.spent
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Gain / spend
    // ═══════════════════════════════════════════════════════════════════════

    /// Add `amount`, clamped at max. Returns the amount actually applied.
    pub fn add(&mut self, now: Duration, amount: f64, cause: Cause) -> Result<f64, ResourceError> {
        if !(amount >= 0.0) {
            return Err(ResourceError::NegativeGain {
                resource: self.resource,
                amount,
                cause,
                at: now,
            });
        }

        let old = self.current;
        let new = (old + amount).min(self.max);
        let applied = new - old;
        self.metrics.entry(cause).record_gain(amount, applied);

        debug!(
            actor = %self.owner,
            resource = %self.resource,
            at = ?now,
            amount,
            from = %cause,
            old,
            new,
            "Gained resource"
        );

        self.current = new;
        self.gained += applied;
        Ok(applied)
    }

    /// Subtract `amount` without re-checking affordability.
    pub fn spend(&mut self, now: Duration, amount: f64, cause: Cause) -> Result<(), ResourceError> {
        if !(amount >= 0.0) {
            return Err(ResourceError::NegativeSpend {
                resource: self.resource,
                amount,
                cause,
                at: now,
            });
        }

        let old = self.current;
        let new = old - amount;
        self.metrics.entry(cause).record_spend(amount);

        debug!(
            actor = %self.owner,
            resource = %self.resource,
            at = ?now,
            amount,
            from = %cause,
            old,
            new,
            "Spent resource"
        );

        self.current = new;
        self.spent += amount;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Regeneration
    // ═══════════════════════════════════════════════════════════════════════

    /// Apply one regen tick worth `regen_interval` of regeneration.
    ///
    /// Rates are recomputed from `stats` now. Returns the amount applied.
    pub fn regen_tick(&mut self, now: Duration, stats: &dyn RegenSource) -> Result<f64, ResourceError> {
        self.last_rates = RegenRates::per_second(stats).per_tick(self.regen_interval);

        let (phase, regen) = if self.in_active_window(now) {
            (RegenPhase::WhileActive, self.last_rates.while_active)
        } else {
            (RegenPhase::WhileIdle, self.last_rates.while_idle)
        };

        self.add(now, regen.max(0.0), Cause::Regen(phase))
    }

    /// Whether `now` is inside the active window.
    pub fn in_active_window(&self, now: Duration) -> bool {
        self.active_window.is_some_and(|w| w.contains(now))
    }

    /// When the active window closes, if this bar has one.
    pub fn active_window_expires_at(&self) -> Option<Duration> {
        self.active_window.map(|w| w.expires_at())
    }

    /// Extend the active window to at least `now + length`.
    pub fn refresh_active_window(&mut self, now: Duration) {
        if let Some(window) = self.active_window.as_mut() {
            window.refresh(now);
        }
    }

    /// Estimated wait until `desired` is available through regen alone.
    ///
    /// Uses the active rate until the active window closes and the idle rate
    /// after. Advisory only: any spend in between invalidates it. Returns
    /// [`NEVER`] when the idle rate cannot get there, or when the pool does
    /// not regenerate on a timer at all.
    pub fn time_until(&self, now: Duration, desired: f64, stats: &dyn RegenSource) -> Duration {
        let mut needed = desired - self.current;
        if needed <= 0.0 {
            return Duration::ZERO;
        }
        if !self.resource.regenerates_on_tick() {
            return NEVER;
        }

        // +1ns absorbs floating point rounding in the conversions below
        let epsilon = Duration::from_nanos(1);
        let rates = RegenRates::per_second(stats);
        let window_left = self
            .active_window
            .map(|w| w.remaining(now))
            .unwrap_or(Duration::ZERO);

        if rates.while_active > 0.0 {
            let wait = duration_from_seconds(needed / rates.while_active);
            if wait <= window_left {
                return wait.saturating_add(epsilon);
            }
            needed -= rates.while_active * window_left.as_secs_f64();
        }

        if rates.while_idle <= 0.0 {
            return NEVER;
        }

        window_left
            .saturating_add(duration_from_seconds(needed / rates.while_idle))
            .saturating_add(epsilon)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Starvation
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether the actor is currently starved of this resource.
    pub fn is_starved(&self) -> bool {
        self.starvation.is_starved()
    }

    /// Start (or continue) a starvation interval.
    pub fn mark_starved(&mut self, now: Duration, required: f64) {
        self.starvation.mark(now, required);
    }

    /// End the open starvation interval. Returns its length.
    pub fn clear_starved(&mut self, now: Duration) -> Option<Duration> {
        self.starvation.clear(now)
    }

    /// Start of the open interval.
    pub fn starved_since(&self) -> Option<Duration> {
        self.starvation.since()
    }

    /// Smallest requirement that failed during the open interval.
    pub fn starved_waiting_for(&self) -> Option<f64> {
        self.starvation.outstanding()
    }

    /// Total closed starvation time this iteration.
    pub fn starved_duration(&self) -> Duration {
        self.starvation.total()
    }

    /// Closed starvation intervals this iteration.
    pub fn starved_intervals(&self) -> &[StarvedInterval] {
        self.starvation.intervals()
    }

    /// Number of starvation intervals opened this iteration.
    pub fn starvation_events(&self) -> u32 {
        self.starvation.events()
    }

    /// Start of the first starvation interval this iteration.
    pub fn first_starved_at(&self) -> Option<Duration> {
        self.starvation.first_at()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Iteration lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Close any open starvation interval at the iteration end.
    pub fn done_iteration(&mut self, now: Duration) {
        if let Some(elapsed) = self.starvation.clear(now) {
            debug!(
                actor = %self.owner,
                resource = %self.resource,
                elapsed = ?elapsed,
                "Closed starvation interval at iteration end"
            );
        }
    }

    /// Restore the starting state for a new iteration.
    ///
    /// Lifetime metric totals are kept; per-iteration fields are cleared.
    pub fn reset(&mut self) {
        self.current = self.start_value;
        self.last_rates = RegenRates::default();
        if let Some(window) = self.active_window.as_mut() {
            window.reset();
        }
        self.starvation.reset();
        self.metrics.reset_iteration();
        self.gained = 0.0;
        self.spent = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regen::StatBlock;
    use combatsim_types::AbilityId;
    use tracing_test::traced_test;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn spell() -> Cause {
        Cause::Ability(AbilityId::new(10))
    }

    /// Fixed per-second rates for predictable regen.
    struct FixedRegen {
        flat: f64,
        secondary: f64,
    }

    impl RegenSource for FixedRegen {
        fn flat_regen_per_second(&self) -> f64 {
            self.flat
        }
        fn secondary_regen_per_second(&self) -> f64 {
            self.secondary
        }
    }

    #[traced_test]
    #[test]
    fn test_add_clamps_and_records_applied_delta() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);
        bar.spend(secs(0), 30.0, spell()).unwrap();

        for amount in [0.0, 10.0, 25.0, 1000.0] {
            let before = bar.current();
            let applied = bar.add(secs(1), amount, Cause::Combat).unwrap();
            assert!(bar.current() <= bar.max());
            assert_eq!(applied, (before + amount).min(bar.max()) - before);
        }

        let combat = bar.metrics().get(&Cause::Combat).unwrap();
        assert_eq!(combat.total_gained, 30.0);
        assert_eq!(combat.total_attempted, 1035.0);
        assert_eq!(bar.total_gained(), 30.0);
    }

    #[traced_test]
    #[test]
    fn test_negative_amounts_are_rejected() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);

        assert!(matches!(
            bar.add(secs(1), -1.0, Cause::Combat),
            Err(ResourceError::NegativeGain { .. })
        ));
        assert!(matches!(
            bar.spend(secs(1), -5.0, spell()),
            Err(ResourceError::NegativeSpend { .. })
        ));
        assert!(bar.add(secs(1), f64::NAN, Cause::Combat).is_err());
        assert_eq!(bar.current(), 100.0);
    }

    #[traced_test]
    #[test]
    fn test_spend_is_not_clamped() {
        let mut bar = ResourceBar::rage(ActorId(1), 100.0, 5.0);
        bar.spend(secs(0), 10.0, spell()).unwrap();
        assert_eq!(bar.current(), -5.0);
        assert_eq!(bar.total_spent(), 10.0);
    }

    #[traced_test]
    #[test]
    fn test_regen_tick_uses_window_phase() {
        let mut bar = ResourceBar::mana(ActorId(0), 1000.0);
        let stats = FixedRegen {
            flat: 1.0,
            secondary: 9.0,
        };
        bar.spend(secs(0), 500.0, spell()).unwrap();
        bar.refresh_active_window(secs(0));

        // Inside window: flat only, 2s tick
        assert_eq!(bar.regen_tick(secs(2), &stats).unwrap(), 2.0);
        // Outside window: flat + secondary
        assert_eq!(bar.regen_tick(secs(6), &stats).unwrap(), 20.0);

        let active = bar.metrics().get(&Cause::Regen(RegenPhase::WhileActive)).unwrap();
        let idle = bar.metrics().get(&Cause::Regen(RegenPhase::WhileIdle)).unwrap();
        assert_eq!(active.total_gained, 2.0);
        assert_eq!(idle.total_gained, 20.0);
        assert_eq!(bar.regen_per_tick_while_idle(), 20.0);
    }

    #[traced_test]
    #[test]
    fn test_regen_recomputed_from_current_stats() {
        let mut bar = ResourceBar::mana(ActorId(0), 1000.0);
        bar.spend(secs(0), 900.0, spell()).unwrap();

        let mut stats = StatBlock::new(0.0, 0.0);
        let first = bar.regen_tick(secs(2), &stats).unwrap();
        stats.spirit = 100.0;
        let second = bar.regen_tick(secs(4), &stats).unwrap();

        assert_eq!(first, 15.0);
        assert_eq!(second, 35.0);
    }

    #[traced_test]
    #[test]
    fn test_negative_regen_is_floored() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);
        bar.spend(secs(0), 50.0, spell()).unwrap();
        let stats = FixedRegen {
            flat: -10.0,
            secondary: 0.0,
        };
        assert_eq!(bar.regen_tick(secs(2), &stats).unwrap(), 0.0);
        assert_eq!(bar.current(), 50.0);
    }

    #[traced_test]
    #[test]
    fn test_time_until_crosses_into_idle_rate() {
        let mut bar = ResourceBar::mana(ActorId(0), 1000.0);
        bar.spend(secs(0), 1000.0, spell()).unwrap();
        bar.refresh_active_window(secs(0));
        let stats = FixedRegen {
            flat: 2.0,
            secondary: 8.0,
        };

        // 6 mana fits inside the 5s window at 2/s
        let short = bar.time_until(secs(0), 6.0, &stats);
        assert!(short >= secs(3) && short < secs(3) + Duration::from_millis(1));

        // 60 mana: 10 during the window, remaining 50 at 10/s
        let long = bar.time_until(secs(0), 60.0, &stats);
        assert!(long >= secs(10) && long < secs(10) + Duration::from_millis(1));

        // Already affordable
        assert_eq!(bar.time_until(secs(0), -1.0, &stats), Duration::ZERO);

        // Window half elapsed: 2.5s left at 2/s = 5, remaining 55 at 10/s
        let later = bar.time_until(Duration::from_millis(2500), 60.0, &stats);
        assert!(later >= Duration::from_millis(8000) && later < Duration::from_millis(8001));
    }

    #[traced_test]
    #[test]
    fn test_time_until_unreachable() {
        let mut bar = ResourceBar::mana(ActorId(0), 100.0);
        bar.spend(secs(0), 100.0, spell()).unwrap();
        let stats = FixedRegen {
            flat: 0.0,
            secondary: 0.0,
        };
        assert_eq!(bar.time_until(secs(0), 10.0, &stats), NEVER);

        // Rage only grows through combat
        let rage = ResourceBar::rage(ActorId(1), 100.0, 0.0);
        assert_eq!(rage.time_until(secs(0), 10.0, &StatBlock::new(0.0, 100.0)), NEVER);
    }

    #[traced_test]
    #[test]
    fn test_reset_restores_start_and_keeps_totals() {
        let mut bar = ResourceBar::rage(ActorId(2), 100.0, 20.0);
        bar.add(secs(1), 30.0, Cause::Combat).unwrap();
        bar.mark_starved(secs(2), 80.0);
        bar.done_iteration(secs(5));
        assert_eq!(bar.starved_duration(), secs(3));

        bar.reset();
        assert_eq!(bar.current(), 20.0);
        assert!(!bar.is_starved());
        assert_eq!(bar.starved_duration(), Duration::ZERO);
        assert_eq!(bar.total_gained(), 0.0);

        let combat = bar.metrics().get(&Cause::Combat).unwrap();
        assert_eq!(combat.iteration_gain, 0.0);
        assert_eq!(combat.total_gained, 30.0);
    }
}
