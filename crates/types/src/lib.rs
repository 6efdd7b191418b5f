//! Core types for the combat simulation.
//!
//! Shared vocabulary used by every other crate in the workspace:
//!
//! - Identifiers: [`ActorId`], [`AbilityId`], [`DotId`]
//! - [`ResourceType`] and the metrics key [`Cause`]
//! - [`Priority`]: tie-break ordering for actions at the same timestamp
//! - [`HitOutcome`] / [`TickResult`]: resolved periodic ticks
//! - [`ResourceError`]: caller defects detected by resource bars
//! - Simulated-time helpers in [`time`]

mod cause;
mod error;
mod identifiers;
mod outcome;
mod priority;
pub mod time;

pub use cause::{Cause, RegenPhase};
pub use error::ResourceError;
pub use identifiers::{AbilityId, ActorId, DotId, ResourceType};
pub use outcome::{HitOutcome, TickResult};
pub use priority::Priority;
pub use time::{duration_from_seconds, NEVER};
