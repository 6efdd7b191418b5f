//! Error types for the simulation core.

use combatsim_types::ResourceError;
use std::time::Duration;
use thiserror::Error;

/// Invariant violations that abort the current trial.
///
/// Insufficient resources and same-time scheduling conflicts are normal
/// outcomes and never show up here.
#[derive(Debug, Error)]
pub enum SimError {
    /// An action was scheduled before the current clock.
    #[error("action '{label}' scheduled at {at:?}, before the current time {now:?}")]
    ScheduledInPast {
        label: String,
        at: Duration,
        now: Duration,
    },

    /// Resource bar misuse (negative amounts, missing bar).
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Lookup of an actor, ability or dot that does not exist.
    #[error("unknown {kind} {id}")]
    Unknown { kind: &'static str, id: u32 },

    /// Declarative options that cannot be turned into a working component.
    #[error("invalid configuration for {what}: {reason}")]
    InvalidConfig { what: String, reason: String },

    /// Failure raised inside a scheduled action, tagged with its label and
    /// the clock time it fired at.
    #[error("'{label}' failed at {at:?}: {source}")]
    Action {
        label: String,
        at: Duration,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// Attach the failing action's label and firing time.
    ///
    /// Errors that already carry an action context are returned unchanged so
    /// the innermost action is reported.
    pub fn in_action(self, label: &str, at: Duration) -> SimError {
        match self {
            err @ SimError::Action { .. } => err,
            other => SimError::Action {
                label: label.to_string(),
                at,
                source: Box::new(other),
            },
        }
    }

    /// Shorthand for [`SimError::Unknown`].
    pub fn unknown(kind: &'static str, id: u32) -> SimError {
        SimError::Unknown { kind, id }
    }

    /// The underlying error with any action context stripped.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::Action { source, .. } => source.root(),
            other => other,
        }
    }
}
