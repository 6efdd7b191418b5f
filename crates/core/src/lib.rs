//! Event scheduler for the combat simulation.
//!
//! This crate provides the discrete-event core every trial runs on:
//!
//! - [`Scheduler`]: the simulated clock plus the ordered pending-action queue
//! - [`Next`]: what a fired action wants next (done, requeue, end trial)
//! - [`ActionId`]: stable handle for cancelling or rescheduling an action
//! - [`SimError`]: invariant violations that abort a trial
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Scheduler<W>                        │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Queue (BTreeMap<EventKey, PendingAction<W>>)      │  │
//! │  │  Ordered by: time, priority, sequence              │  │
//! │  └─────────────────────────┬──────────────────────────┘  │
//! │                            │ pop smallest key            │
//! │                            ▼                             │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  clock = key.time; callback(&mut Scheduler, &mut W)│  │
//! │  └─────────────────────────┬──────────────────────────┘  │
//! │                            │                             │
//! │                            ▼                             │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Next::At(t) → requeue   Next::EndTrial → stop     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is:
//! - **Sequential**: one action at a time, no callback ever blocks
//! - **Deterministic**: same initial actions = same firing order
//! - **Monotonic**: the clock never moves backwards

mod action;
mod error;
mod event_queue;
mod scheduler;

pub use action::{ActionFn, ActionId, Next, PendingAction};
pub use error::SimError;
pub use event_queue::EventKey;
pub use scheduler::{AdvanceSummary, Scheduler};
