//! Resource bars and ability costs.
//!
//! A [`ResourceBar`] owns one actor's pool of a resource: clamped gains,
//! unclamped spends, timed regeneration with an active window, starvation
//! intervals and per-cause metrics. A [`CostStrategy`] decides whether an
//! ability can be paid for and pays it.
//!
//! Nothing here schedules events. The simulation drives `regen_tick` from a
//! scheduler action and consults cost strategies synchronously at cast time.

mod bar;
pub mod cost;
mod metrics;
mod regen;
mod starvation;

pub use bar::ResourceBar;
pub use cost::{CostOptions, CostStrategy, ManaCost, RageCost, SpellCost};
pub use metrics::{MetricsRegistry, ResourceMetrics};
pub use regen::{
    ActiveWindow, RegenRates, RegenSource, StatBlock, DEFAULT_ACTIVE_WINDOW,
    DEFAULT_REGEN_INTERVAL,
};
pub use starvation::{Starvation, StarvedInterval};
