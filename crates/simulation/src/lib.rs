//! Deterministic combat trial runner.
//!
//! Builds a [`TrialState`] world of actors, abilities and periodic effects,
//! drives it on the event scheduler for a fixed simulated duration, and
//! reports damage and resource starvation. Given the same seed, a trial
//! produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         Trial                           │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  Scheduler<TrialState>                             │ │
//! │  │  regen (REGEN) · swings (AUTO_ATTACK)              │ │
//! │  │  dot ticks / travel / aura · rotations (GCD)       │ │
//! │  │  trial end (TRIAL_END)                             │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  TrialState: actors + bars, abilities + costs,     │ │
//! │  │  DotSet, ChaCha8Rng, OutcomeResolver, counters     │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  TrialReport → SimulationStats                     │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Independent iterations can run in parallel with [`run_parallel`]; each
//! one is built by its own factory call and shares nothing.

mod actor;
mod config;
mod effects;
mod outcome;
mod parallel;
mod report;
mod rotation;
mod state;
mod trial;

pub use actor::Actor;
pub use config::{ActorConfig, PoolConfig, TrialConfig};
pub use effects::SnapshotDot;
pub use outcome::{ChanceResolver, OutcomeResolver};
pub use parallel::{iteration_seed, run_parallel};
pub use report::{ResourceReport, SimulationStats, Summary, TrialReport};
pub use rotation::{Rotation, SwingTimer};
pub use state::{Ability, CastCounters, CastOutcome, DamageTally, TrialState};
pub use trial::Trial;
