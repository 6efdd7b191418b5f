//! Stock periodic effects.

use crate::state::TrialState;
use combatsim_periodic::{DotContext, PeriodicEffect};
use combatsim_types::TickResult;
use serde::Deserialize;

/// Damage over time scaled by the caster's spell power at application.
///
/// Each tick deals `base + coefficient * spell_power`, captured when the
/// effect is applied or refreshed, with a fresh hit/crit roll per tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SnapshotDot {
    /// Damage per tick before spell power.
    pub base: f64,
    /// Spell power coefficient per tick.
    #[serde(default)]
    pub coefficient: f64,
}

impl SnapshotDot {
    /// Effect dealing `base + coefficient * spell_power` per tick.
    pub fn new(base: f64, coefficient: f64) -> Self {
        Self { base, coefficient }
    }
}

impl PeriodicEffect<TrialState> for SnapshotDot {
    fn on_snapshot(&self, world: &mut TrialState, ctx: &DotContext, _is_refresh: bool) -> f64 {
        let spell_power = world.actor(ctx.caster).map(|a| a.spell_power).unwrap_or(0.0);
        self.base + self.coefficient * spell_power
    }

    fn on_tick(&self, world: &mut TrialState, ctx: &DotContext) -> TickResult {
        let outcome = world.roll();
        TickResult {
            dot: ctx.dot,
            ability: ctx.ability,
            target: ctx.target,
            tick: ctx.tick,
            outcome,
            amount: world.scale(outcome, ctx.magnitude),
        }
    }
}
