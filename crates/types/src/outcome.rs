//! Resolved outcomes of periodic ticks.

use crate::{AbilityId, ActorId, DotId};
use std::fmt;

/// Result of a hit/crit roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitOutcome {
    /// Avoided entirely; nothing lands.
    Miss,
    /// Normal hit.
    Hit,
    /// Critical hit.
    Crit,
}

impl HitOutcome {
    /// Whether any amount lands.
    pub fn landed(self) -> bool {
        !matches!(self, HitOutcome::Miss)
    }
}

impl fmt::Display for HitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitOutcome::Miss => f.write_str("miss"),
            HitOutcome::Hit => f.write_str("hit"),
            HitOutcome::Crit => f.write_str("crit"),
        }
    }
}

/// One resolved tick of a periodic effect, ready to be applied to its target.
///
/// Resolution and application are separate steps so a travel delay can sit
/// between them.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Effect instance that produced the tick.
    pub dot: DotId,
    /// Ability the damage is attributed to.
    pub ability: AbilityId,
    /// Recipient of the outcome.
    pub target: ActorId,
    /// 1-based tick index.
    pub tick: u32,
    /// Hit/crit resolution for this tick.
    pub outcome: HitOutcome,
    /// Amount to apply (zero on a miss).
    pub amount: f64,
}
