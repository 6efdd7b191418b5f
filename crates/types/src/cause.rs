//! Metrics attribution for resource changes.

use crate::AbilityId;
use std::fmt;

/// Which regen rate produced a regen tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegenPhase {
    /// Inside the active window after a spend.
    WhileActive,
    /// Outside the active window.
    WhileIdle,
}

/// What produced or consumed a resource.
///
/// Used purely as a metrics key; the core never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cause {
    /// Cost paid for, or gain granted by, an ability.
    Ability(AbilityId),
    /// Partial refund of an ability's cost.
    Refund(AbilityId),
    /// Timed regeneration.
    Regen(RegenPhase),
    /// Combat events feeding a combat-generated pool (melee hits, damage taken).
    Combat,
}

impl Cause {
    /// The ability this cause is attributed to, if any.
    pub fn ability(&self) -> Option<AbilityId> {
        match self {
            Cause::Ability(id) | Cause::Refund(id) => Some(*id),
            Cause::Regen(_) | Cause::Combat => None,
        }
    }

    /// Whether this is a regen tick of either phase.
    pub fn is_regen(&self) -> bool {
        matches!(self, Cause::Regen(_))
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Ability(id) => write!(f, "{}", id),
            Cause::Refund(id) => write!(f, "Refund({})", id),
            Cause::Regen(RegenPhase::WhileActive) => f.write_str("Regen(active)"),
            Cause::Regen(RegenPhase::WhileIdle) => f.write_str("Regen(idle)"),
            Cause::Combat => f.write_str("Combat"),
        }
    }
}
