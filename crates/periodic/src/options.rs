//! Declarative periodic effect configuration.

use combatsim_core::SimError;
use combatsim_types::{duration_from_seconds, time::millis};
use serde::Deserialize;
use std::time::Duration;

/// What re-applying an active effect does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Reset the tick count, take a fresh snapshot and restart the tick and
    /// aura schedules from now.
    #[default]
    Restart,
    /// Keep the tick count and schedule; only the snapshot is rewritten.
    Rollover,
    /// Leave the running effect untouched and report the application as
    /// rejected.
    Reject,
}

/// Delay between a tick resolving and its result landing on the target.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelDelay {
    /// Constant delay, in milliseconds.
    Fixed(#[serde(with = "millis")] Duration),
    /// Projectile covering `distance` at `speed` (units per second).
    Projectile { speed: f64, distance: f64 },
}

impl TravelDelay {
    /// Time between resolution and landing.
    pub fn delay(&self) -> Duration {
        match *self {
            TravelDelay::Fixed(delay) => delay,
            TravelDelay::Projectile { speed, distance } => duration_from_seconds(distance / speed),
        }
    }
}

/// Configuration of one periodic effect.
///
/// ```json
/// { "number_of_ticks": 5, "tick_length": 3000, "refresh": "rollover",
///   "aura_duration": 14000, "travel": { "projectile": { "speed": 28, "distance": 20 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DotOptions {
    /// Ticks per application.
    pub number_of_ticks: u32,

    /// Interval between ticks, in milliseconds.
    #[serde(with = "millis")]
    pub tick_length: Duration,

    /// Behaviour when applied while active.
    #[serde(default)]
    pub refresh: RefreshPolicy,

    /// Bounding aura duration, in milliseconds. Defaults to
    /// `number_of_ticks * tick_length`.
    #[serde(default, with = "millis::option")]
    pub aura_duration: Option<Duration>,

    /// Delay before each tick lands.
    #[serde(default)]
    pub travel: Option<TravelDelay>,
}

impl DotOptions {
    /// `number_of_ticks` ticks every `tick_length`, restarting on refresh.
    pub fn new(number_of_ticks: u32, tick_length: Duration) -> Self {
        Self {
            number_of_ticks,
            tick_length,
            refresh: RefreshPolicy::default(),
            aura_duration: None,
            travel: None,
        }
    }

    /// Set the refresh policy.
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Bound the effect by an aura of `duration`.
    pub fn with_aura_duration(mut self, duration: Duration) -> Self {
        self.aura_duration = Some(duration);
        self
    }

    /// Delay every tick by `travel`.
    pub fn with_travel(mut self, travel: TravelDelay) -> Self {
        self.travel = Some(travel);
        self
    }

    /// Scheduled duration of all ticks.
    pub fn tick_span(&self) -> Duration {
        self.tick_length.saturating_mul(self.number_of_ticks)
    }

    /// Effective aura duration.
    pub fn aura_duration(&self) -> Duration {
        self.aura_duration.unwrap_or_else(|| self.tick_span())
    }

    /// Effective travel delay (zero when landing is immediate).
    pub fn travel_delay(&self) -> Duration {
        self.travel.map(|t| t.delay()).unwrap_or(Duration::ZERO)
    }

    /// Reject options that cannot produce a working effect.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: &str| SimError::InvalidConfig {
            what: "periodic effect".to_string(),
            reason: reason.to_string(),
        };

        if self.number_of_ticks == 0 {
            return Err(invalid("number_of_ticks must be at least 1"));
        }
        if self.tick_length.is_zero() {
            return Err(invalid("tick_length must be positive"));
        }
        if self.aura_duration.is_some_and(|d| d.is_zero()) {
            return Err(invalid("aura_duration must be positive"));
        }
        if let Some(TravelDelay::Projectile { speed, distance }) = self.travel {
            if !(speed > 0.0) || !(distance >= 0.0) {
                return Err(invalid("projectile speed must be positive and distance non-negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let options: DotOptions =
            serde_json::from_str(r#"{ "number_of_ticks": 7, "tick_length": 3000 }"#).unwrap();

        assert_eq!(options, DotOptions::new(7, Duration::from_secs(3)));
        assert_eq!(options.refresh, RefreshPolicy::Restart);
        assert_eq!(options.aura_duration(), Duration::from_secs(21));
        assert_eq!(options.travel_delay(), Duration::ZERO);
    }

    #[test]
    fn test_deserialize_full() {
        let options: DotOptions = serde_json::from_str(
            r#"{
                "number_of_ticks": 5,
                "tick_length": 1000,
                "refresh": "rollover",
                "aura_duration": 4500,
                "travel": { "projectile": { "speed": 20.0, "distance": 10.0 } }
            }"#,
        )
        .unwrap();

        assert_eq!(options.refresh, RefreshPolicy::Rollover);
        assert_eq!(options.aura_duration(), Duration::from_millis(4500));
        assert_eq!(options.travel_delay(), Duration::from_millis(500));

        let fixed: TravelDelay = serde_json::from_str(r#"{ "fixed": 250 }"#).unwrap();
        assert_eq!(fixed.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate() {
        assert!(DotOptions::new(3, Duration::from_secs(1)).validate().is_ok());
        assert!(DotOptions::new(0, Duration::from_secs(1)).validate().is_err());
        assert!(DotOptions::new(3, Duration::ZERO).validate().is_err());

        let stalled = DotOptions::new(3, Duration::from_secs(1)).with_travel(TravelDelay::Projectile {
            speed: 0.0,
            distance: 10.0,
        });
        assert!(matches!(stalled.validate(), Err(SimError::InvalidConfig { .. })));
    }
}
