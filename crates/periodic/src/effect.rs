//! Extension points for effect behaviour and the world that hosts effects.

use crate::dot::DotSet;
use combatsim_core::SimError;
use combatsim_types::{AbilityId, ActorId, DotId, TickResult};
use std::time::Duration;

/// Read-only view of an effect handed to [`PeriodicEffect`] hooks.
///
/// A copy rather than a borrow, so hooks can freely mutate the world the
/// effect lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotContext {
    /// Effect instance.
    pub dot: DotId,
    /// Ability the effect belongs to.
    pub ability: AbilityId,
    /// Who applied it.
    pub caster: ActorId,
    /// Who it ticks on.
    pub target: ActorId,
    /// Ticks fired so far, including the one being resolved.
    pub tick: u32,
    /// Ticks per application.
    pub number_of_ticks: u32,
    /// Snapshot magnitude in effect.
    pub magnitude: f64,
    /// Simulated time of the hook.
    pub now: Duration,
    /// Tick forced by an aura expiring before its scheduled time.
    pub forced: bool,
}

impl DotContext {
    /// Whether this is the last tick of the application.
    pub fn is_final_tick(&self) -> bool {
        self.tick == self.number_of_ticks
    }
}

/// Behaviour of one kind of periodic effect.
///
/// `W` is the world the effect reads stats from and writes results to.
pub trait PeriodicEffect<W> {
    /// Magnitude captured when the effect is applied (or refreshed).
    ///
    /// Later stat changes do not alter an existing snapshot.
    fn on_snapshot(&self, world: &mut W, ctx: &DotContext, is_refresh: bool) -> f64;

    /// Resolve one tick. Hit/crit is rolled fresh every tick.
    fn on_tick(&self, world: &mut W, ctx: &DotContext) -> TickResult;

    /// Follow-on behaviour when the effect is torn down.
    fn on_expire(&self, _world: &mut W, _ctx: &DotContext) -> Result<(), SimError> {
        Ok(())
    }
}

/// World that owns a [`DotSet`] and receives landed ticks.
pub trait DotHost: Sized + 'static {
    /// Effects in this world.
    fn dots(&self) -> &DotSet<Self>;

    /// Effects in this world, mutably.
    fn dots_mut(&mut self) -> &mut DotSet<Self>;

    /// Apply a resolved tick to its target.
    fn land_tick(&mut self, now: Duration, result: &TickResult) -> Result<(), SimError>;
}
