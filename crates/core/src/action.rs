//! Pending actions and their handles.

use crate::{Scheduler, SimError};
use combatsim_types::Priority;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Opaque handle to a registered action.
///
/// Stays valid across self-requeues, so a registrant can keep one handle for
/// a recurring action and cancel or reschedule it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u64);

impl ActionId {
    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action-{}", self.0)
    }
}

/// What an action wants after it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Finished; ownership goes back to the registrant.
    Done,
    /// Requeue the same action (same id and priority) at the given time.
    At(Duration),
    /// Terminate the trial. Nothing else runs in this `advance()` call.
    EndTrial,
}

/// Callback invoked when an action fires.
///
/// Receives the scheduler (clock already set to the action's time) so it can
/// register more actions, and the trial state it operates on.
pub type ActionFn<W> = Box<dyn FnMut(&mut Scheduler<W>, &mut W) -> Result<Next, SimError>>;

/// An action owned by the scheduler queue until it fires.
pub struct PendingAction<W> {
    pub(crate) id: ActionId,
    pub(crate) label: Cow<'static, str>,
    pub(crate) priority: Priority,
    pub(crate) on_action: ActionFn<W>,
}

impl<W> PendingAction<W> {
    /// Handle of this action.
    pub fn id(&self) -> ActionId {
        self.id
    }

    /// Diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tie-break priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl<W> fmt::Debug for PendingAction<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
