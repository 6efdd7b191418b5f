//! Regeneration rates and the active window.
//!
//! Rates are derived from current stat values every time they are needed
//! and never cached across a trial.

use serde::Deserialize;
use std::time::Duration;

/// Default cadence of the regen action.
pub const DEFAULT_REGEN_INTERVAL: Duration = Duration::from_secs(2);

/// Default length of the active window after a spend.
pub const DEFAULT_ACTIVE_WINDOW: Duration = Duration::from_secs(5);

/// Current stat values that regen rates are derived from.
///
/// Implemented by whatever owns the actor's stats; the resource bar only
/// reads it at the instant a regen tick fires.
pub trait RegenSource {
    /// Flat regen per second, independent of activity.
    fn flat_regen_per_second(&self) -> f64;

    /// Secondary-stat regen per second before multipliers.
    fn secondary_regen_per_second(&self) -> f64;

    /// Multiplier applied to the secondary term.
    fn secondary_regen_multiplier(&self) -> f64 {
        1.0
    }

    /// Fraction of the secondary term kept inside the active window.
    fn active_secondary_fraction(&self) -> f64 {
        0.0
    }

    /// Keep the full secondary term inside the active window.
    fn force_full_secondary(&self) -> bool {
        false
    }
}

/// Regen rates for both phases, in resource per second or per tick
/// depending on how they were produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegenRates {
    /// Rate inside the active window.
    pub while_active: f64,
    /// Rate outside the active window.
    pub while_idle: f64,
}

impl RegenRates {
    /// Per-second rates from current stat values.
    pub fn per_second(source: &dyn RegenSource) -> Self {
        let flat = source.flat_regen_per_second();
        let secondary = source.secondary_regen_per_second() * source.secondary_regen_multiplier();

        let fraction = source.active_secondary_fraction();
        let active_secondary = if source.force_full_secondary() {
            secondary
        } else if fraction != 0.0 {
            secondary * fraction
        } else {
            0.0
        };

        Self {
            while_active: flat + active_secondary,
            while_idle: flat + secondary,
        }
    }

    /// Scale per-second rates to one tick of `interval`.
    pub fn per_tick(self, interval: Duration) -> Self {
        let secs = interval.as_secs_f64();
        Self {
            while_active: self.while_active * secs,
            while_idle: self.while_idle * secs,
        }
    }
}

/// Stat values relevant to mana regeneration.
///
/// The default formula gives `mp5 / 5` per second flat plus
/// `7.5 + spirit / 10` per second from spirit.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatBlock {
    /// Mana per 5 seconds.
    pub mp5: f64,
    /// Spirit.
    pub spirit: f64,
    /// Multiplier on spirit regen.
    pub spirit_regen_multiplier: f64,
    /// Fraction of spirit regen kept while casting.
    pub spirit_regen_rate_casting: f64,
    /// Full spirit regen while casting.
    pub force_full_spirit_regen: bool,
    /// Replaces the default spirit formula (per second), for classes that
    /// regenerate differently.
    pub spirit_regen_override: Option<f64>,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            mp5: 0.0,
            spirit: 0.0,
            spirit_regen_multiplier: 1.0,
            spirit_regen_rate_casting: 0.0,
            force_full_spirit_regen: false,
            spirit_regen_override: None,
        }
    }
}

impl StatBlock {
    /// Stats with the given mp5 and spirit and default multipliers.
    pub fn new(mp5: f64, spirit: f64) -> Self {
        Self {
            mp5,
            spirit,
            ..Default::default()
        }
    }
}

impl RegenSource for StatBlock {
    fn flat_regen_per_second(&self) -> f64 {
        self.mp5 / 5.0
    }

    fn secondary_regen_per_second(&self) -> f64 {
        // 15 + spirit/5 every 2s tick
        self.spirit_regen_override
            .unwrap_or(7.5 + self.spirit / 10.0)
    }

    fn secondary_regen_multiplier(&self) -> f64 {
        self.spirit_regen_multiplier
    }

    fn active_secondary_fraction(&self) -> f64 {
        self.spirit_regen_rate_casting
    }

    fn force_full_secondary(&self) -> bool {
        self.force_full_spirit_regen
    }
}

/// Rolling window after a spend during which the active regen rate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    length: Duration,
    expires_at: Duration,
}

impl ActiveWindow {
    /// A window of `length` that is not open yet.
    pub fn new(length: Duration) -> Self {
        Self {
            length,
            expires_at: Duration::ZERO,
        }
    }

    /// Configured length.
    pub fn length(&self) -> Duration {
        self.length
    }

    /// When the window closes.
    pub fn expires_at(&self) -> Duration {
        self.expires_at
    }

    /// Extend the window to at least `now + length`. Never shortens it.
    pub fn refresh(&mut self, now: Duration) {
        self.expires_at = self.expires_at.max(now.saturating_add(self.length));
    }

    /// Whether `now` falls inside the window.
    pub fn contains(&self, now: Duration) -> bool {
        now < self.expires_at
    }

    /// Time left in the window at `now`.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.expires_at.saturating_sub(now)
    }

    /// Close the window.
    pub fn reset(&mut self) {
        self.expires_at = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spirit_formula() {
        let stats = StatBlock::new(25.0, 200.0);
        let rates = RegenRates::per_second(&stats);

        // 25 mp5 = 5/s flat; 7.5 + 200/10 = 27.5/s from spirit
        assert_eq!(rates.while_idle, 32.5);
        // No casting regen fraction: only the flat term while active
        assert_eq!(rates.while_active, 5.0);

        let per_tick = rates.per_tick(DEFAULT_REGEN_INTERVAL);
        assert_eq!(per_tick.while_idle, 65.0);
        assert_eq!(per_tick.while_active, 10.0);
    }

    #[test]
    fn test_casting_fraction_and_force_full() {
        let mut stats = StatBlock::new(0.0, 100.0);
        stats.spirit_regen_rate_casting = 0.3;
        stats.spirit_regen_multiplier = 2.0;

        // spirit term: (7.5 + 10) * 2 = 35
        let rates = RegenRates::per_second(&stats);
        assert_eq!(rates.while_idle, 35.0);
        assert!((rates.while_active - 10.5).abs() < 1e-9);

        stats.force_full_spirit_regen = true;
        let rates = RegenRates::per_second(&stats);
        assert_eq!(rates.while_active, 35.0);
    }

    #[test]
    fn test_window_refresh_never_shortens() {
        let mut window = ActiveWindow::new(Duration::from_secs(5));
        assert!(!window.contains(Duration::ZERO));

        window.refresh(Duration::from_secs(10));
        assert_eq!(window.expires_at(), Duration::from_secs(15));

        // Overlapping casts extend rather than shorten
        window.refresh(Duration::from_secs(8));
        assert_eq!(window.expires_at(), Duration::from_secs(15));
        window.refresh(Duration::from_secs(12));
        assert_eq!(window.expires_at(), Duration::from_secs(17));

        assert!(window.contains(Duration::from_secs(16)));
        assert!(!window.contains(Duration::from_secs(17)));
        assert_eq!(window.remaining(Duration::from_secs(14)), Duration::from_secs(3));
    }
}
