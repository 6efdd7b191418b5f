//! Resource accounting errors.

use crate::{AbilityId, Cause, ResourceType};
use std::time::Duration;
use thiserror::Error;

/// Caller defects detected by resource bars.
///
/// These are never produced by a normal "cannot afford" outcome; that is a
/// boolean plus a diagnostic string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// Negative (or NaN) amount passed to `add`.
    #[error("tried to add negative {resource} ({amount}) from {cause} at {at:?}")]
    NegativeGain {
        resource: ResourceType,
        amount: f64,
        cause: Cause,
        at: Duration,
    },

    /// Negative (or NaN) amount passed to `spend`.
    #[error("tried to spend negative {resource} ({amount}) from {cause} at {at:?}")]
    NegativeSpend {
        resource: ResourceType,
        amount: f64,
        cause: Cause,
        at: Duration,
    },

    /// The actor has no bar of the requested type.
    #[error("no {resource} bar on this actor")]
    MissingBar { resource: ResourceType },

    /// Cost options that make no sense (negative cost, refund outside 0..=1).
    #[error("invalid cost for {ability}: {reason}")]
    InvalidCost { ability: AbilityId, reason: String },
}
