//! Ordering key for the pending-action queue.

use combatsim_types::Priority;
use std::time::Duration;

/// Key under which a pending action sits in the queue.
///
/// Ordered by time, then priority (lower first), then insertion sequence.
/// The sequence number makes the order total, so two runs with the same
/// inputs pop actions in exactly the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    /// When the action fires.
    pub time: Duration,
    /// Tie-break for equal times.
    pub priority: Priority,
    /// Insertion order for equal time and priority.
    pub seq: u64,
}
