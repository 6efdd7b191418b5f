//! Tie-break ordering for actions scheduled at the same instant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of a pending action.
///
/// Only consulted when two actions share a timestamp: the lower value fires
/// first. The named constants fix the relative order of the core's own
/// actions; external configuration may use any value in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// Melee swings and other auto attacks.
    pub const AUTO_ATTACK: Self = Priority(0);
    /// Resource regeneration ticks.
    pub const REGEN: Self = Priority(10);
    /// Periodic effect ticks. Must stay below `AURA_EXPIRE`.
    pub const PERIODIC_TICK: Self = Priority(20);
    /// Deferred landing of a resolved tick after travel time.
    pub const TRAVEL: Self = Priority(25);
    /// Expiration of the aura bounding a periodic effect.
    pub const AURA_EXPIRE: Self = Priority(30);
    /// Global-cooldown driven ability casts.
    pub const GCD: Self = Priority(40);
    /// Anything that should run after all of the above.
    pub const LOW: Self = Priority(50);
    /// End of the trial. Fires after every other action due at the same time.
    pub const TRIAL_END: Self = Priority(i32::MAX);
}

impl Default for Priority {
    fn default() -> Self {
        Priority::LOW
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_fires_before_expire() {
        assert!(Priority::PERIODIC_TICK < Priority::AURA_EXPIRE);
        assert!(Priority::PERIODIC_TICK < Priority::TRAVEL);
        assert!(Priority::TRAVEL < Priority::AURA_EXPIRE);
    }

    #[test]
    fn test_trial_end_is_last() {
        for p in [
            Priority::AUTO_ATTACK,
            Priority::REGEN,
            Priority::PERIODIC_TICK,
            Priority::AURA_EXPIRE,
            Priority::GCD,
            Priority::LOW,
        ] {
            assert!(p < Priority::TRIAL_END);
        }
    }
}
