//! Recurring actor behaviour: a priority rotation and a melee swing timer.

use crate::state::{CastOutcome, TrialState};
use combatsim_core::{Next, Scheduler, SimError};
use combatsim_periodic::DotHost;
use combatsim_types::{AbilityId, ActorId, Cause, ResourceType, NEVER};
use std::time::Duration;
use tracing::trace;

/// Fixed-priority rotation: every global cooldown, cast the first ability in
/// the list that is not already ticking on the target and can be afforded.
///
/// When nothing is affordable, the next attempt waits for the shortest
/// regen estimate (but at least one global cooldown).
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    /// Who casts.
    pub caster: ActorId,
    /// Who is targeted.
    pub target: ActorId,
    /// Abilities in priority order.
    pub priorities: Vec<AbilityId>,
    /// Minimum spacing between attempts.
    pub gcd: Duration,
}

impl Rotation {
    /// Empty rotation with a 1.5 second global cooldown.
    pub fn new(caster: ActorId, target: ActorId) -> Self {
        Self {
            caster,
            target,
            priorities: Vec::new(),
            gcd: Duration::from_millis(1500),
        }
    }

    /// Append an ability at the lowest priority.
    pub fn with_ability(mut self, ability: AbilityId) -> Self {
        self.priorities.push(ability);
        self
    }

    /// Set the global cooldown.
    pub fn with_gcd(mut self, gcd: Duration) -> Self {
        self.gcd = gcd;
        self
    }

    /// Reject a rotation that would retry without the clock moving.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.gcd.is_zero() {
            return Err(SimError::InvalidConfig {
                what: format!("rotation {}", self.caster),
                reason: "gcd must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn step(
        &self,
        sched: &mut Scheduler<TrialState>,
        state: &mut TrialState,
    ) -> Result<Next, SimError> {
        let now = sched.now();
        let mut wait = NEVER;

        for &ability in &self.priorities {
            let ticking = state
                .dots()
                .find(ability, self.target)
                .is_some_and(|d| d.is_active());
            if ticking {
                continue;
            }

            match state.cast(sched, self.caster, ability, self.target)? {
                CastOutcome::Insufficient(_) => {
                    wait = wait.min(state.time_until_affordable(now, ability)?);
                }
                _ => return Ok(Next::At(now.saturating_add(self.gcd))),
            }
        }

        let delay = if wait == NEVER { self.gcd } else { wait.max(self.gcd) };
        trace!(actor = %self.caster, at = ?now, delay = ?delay, "Rotation idle");
        Ok(Next::At(now.saturating_add(delay)))
    }
}

/// Melee swings that generate rage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingTimer {
    /// Who swings.
    pub actor: ActorId,
    /// Time between swings.
    pub interval: Duration,
    /// Rage gained per swing.
    pub rage_per_swing: f64,
}

impl SwingTimer {
    /// Swing every `interval` for `rage_per_swing` rage.
    pub fn new(actor: ActorId, interval: Duration, rage_per_swing: f64) -> Self {
        Self {
            actor,
            interval,
            rage_per_swing,
        }
    }

    /// Reject a swing timer that would swing without the clock moving.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.interval.is_zero() {
            return Err(SimError::InvalidConfig {
                what: format!("swing timer {}", self.actor),
                reason: "interval must be positive".to_string(),
            });
        }
        if !(self.rage_per_swing >= 0.0) {
            return Err(SimError::InvalidConfig {
                what: format!("swing timer {}", self.actor),
                reason: format!("rage_per_swing must be non-negative ({})", self.rage_per_swing),
            });
        }
        Ok(())
    }

    pub(crate) fn swing(
        &self,
        sched: &mut Scheduler<TrialState>,
        state: &mut TrialState,
    ) -> Result<Next, SimError> {
        let now = sched.now();
        state.grant(now, self.actor, ResourceType::Rage, self.rage_per_swing, Cause::Combat)?;
        Ok(Next::At(now.saturating_add(self.interval)))
    }
}
