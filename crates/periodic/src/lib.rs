//! Periodic effects ("dots") on the event scheduler.
//!
//! An effect snapshots its magnitude when applied, ticks a fixed number of
//! times at a fixed interval, and is bounded by an aura. Each tick rolls its
//! own hit/crit through [`PeriodicEffect::on_tick`] and lands on the target
//! through [`DotHost::land_tick`], optionally after a travel delay.
//!
//! # Lifecycle
//!
//! ```text
//!            apply()
//!  Inactive ─────────► Active ──── tick × N ────► Inactive (aura may remain)
//!      ▲                │  ▲                              │
//!      │                │  └── apply(): restart / rollover │
//!      │                │                                 │
//!      │   aura expiry: force missing ticks, on_expire    │
//!      └────────────────┴─────────────────────────────────┘
//!                 cancel(): no forced ticks, on_expire
//! ```
//!
//! # Ordering
//!
//! Ticks run at `PERIODIC_TICK`, travel landings at `TRAVEL` and aura expiry
//! at `AURA_EXPIRE`, so at equal times a tick lands before its aura goes.

mod dot;
mod effect;
mod engine;
mod options;

pub use dot::{Dot, DotSet};
pub use effect::{DotContext, DotHost, PeriodicEffect};
pub use engine::{apply, cancel, ApplyOutcome};
pub use options::{DotOptions, RefreshPolicy, TravelDelay};
