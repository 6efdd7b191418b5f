//! Scheduling of periodic effects.
//!
//! Every active effect owns at most two pending actions: its next tick
//! (priority `PERIODIC_TICK`) and its aura expiry (priority `AURA_EXPIRE`).
//! Ticks sort before expiry at equal times, so a tick due exactly when the
//! aura ends always fires normally. When the aura ends first, the missing
//! ticks are forced at the expiry time; an effect therefore always delivers
//! exactly `number_of_ticks` ticks unless it is cancelled.

use crate::effect::DotHost;
use crate::options::RefreshPolicy;
use combatsim_core::{ActionId, Next, Scheduler, SimError};
use combatsim_types::{DotId, Priority, TickResult};
use std::borrow::Cow;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// What an application did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Inactive effect started.
    Applied,
    /// Active effect restarted with a fresh snapshot and schedule.
    Restarted,
    /// Active effect kept its schedule; only the snapshot changed.
    RolledOver,
    /// Active effect left untouched.
    Rejected,
}

impl ApplyOutcome {
    /// Whether the application changed anything.
    pub fn took_effect(self) -> bool {
        !matches!(self, ApplyOutcome::Rejected)
    }
}

/// Apply (or re-apply) an effect at the current time.
pub fn apply<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    id: DotId,
) -> Result<ApplyOutcome, SimError> {
    let now = sched.now();
    let dot = world.dots_mut().dot_mut(id)?;
    let refresh = dot.active;
    let policy = dot.options.refresh;

    if refresh {
        match policy {
            RefreshPolicy::Reject => {
                debug!(dot = %id, ability = %dot.ability, at = ?now, "Re-application rejected");
                return Ok(ApplyOutcome::Rejected);
            }
            RefreshPolicy::Rollover => {
                let effect = Rc::clone(&dot.effect);
                let ctx = dot.context(now, false);
                let magnitude = effect.on_snapshot(world, &ctx, true);

                let dot = world.dots_mut().dot_mut(id)?;
                debug!(
                    dot = %id,
                    ability = %dot.ability,
                    at = ?now,
                    old = dot.magnitude,
                    new = magnitude,
                    ticks_fired = dot.ticks_fired,
                    "Rolled over snapshot"
                );
                dot.magnitude = magnitude;
                return Ok(ApplyOutcome::RolledOver);
            }
            RefreshPolicy::Restart => {}
        }
    }

    dot.ticks_fired = 0;
    dot.active = true;
    dot.aura_active = true;
    dot.applied_at = Some(now);

    let effect = Rc::clone(&dot.effect);
    let ctx = dot.context(now, false);
    let magnitude = effect.on_snapshot(world, &ctx, refresh);

    let dot = world.dots_mut().dot_mut(id)?;
    dot.magnitude = magnitude;
    let tick_at = now.saturating_add(dot.options.tick_length);
    let aura_at = now.saturating_add(dot.options.aura_duration());
    let ability = dot.ability;
    let old_tick = dot.tick_action.take();
    let old_aura = dot.aura_action.take();

    let tick_action = place(
        sched,
        old_tick,
        tick_at,
        Priority::PERIODIC_TICK,
        format!("{ability} tick"),
        move |s: &mut Scheduler<W>, w: &mut W| fire_tick(s, w, id),
    )?;
    let aura_action = place(
        sched,
        old_aura,
        aura_at,
        Priority::AURA_EXPIRE,
        format!("{ability} aura expire"),
        move |s: &mut Scheduler<W>, w: &mut W| expire_aura(s, w, id),
    )?;

    let dot = world.dots_mut().dot_mut(id)?;
    dot.tick_action = Some(tick_action);
    dot.aura_action = Some(aura_action);
    dot.next_tick_at = Some(tick_at);
    dot.aura_expires_at = Some(aura_at);

    debug!(
        dot = %id,
        ability = %ability,
        target = %dot.target,
        at = ?now,
        magnitude,
        first_tick = ?tick_at,
        aura_until = ?aura_at,
        refresh,
        "Applied periodic effect"
    );

    Ok(if refresh {
        ApplyOutcome::Restarted
    } else {
        ApplyOutcome::Applied
    })
}

/// Tear an effect down now without forcing its remaining ticks.
///
/// Returns false if neither ticks nor aura were outstanding. Results already
/// in flight still land.
pub fn cancel<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    id: DotId,
) -> Result<bool, SimError> {
    let now = sched.now();
    let dot = world.dots_mut().dot_mut(id)?;
    if !dot.active && !dot.aura_active {
        return Ok(false);
    }

    if let Some(action) = dot.tick_action.take() {
        sched.cancel(action);
    }
    if let Some(action) = dot.aura_action.take() {
        sched.cancel(action);
    }

    debug!(
        dot = %id,
        ability = %dot.ability,
        at = ?now,
        ticks_fired = dot.ticks_fired,
        "Cancelled periodic effect"
    );

    teardown(world, id, now)?;
    Ok(true)
}

// ═══════════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════════

fn fire_tick<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    id: DotId,
) -> Result<Next, SimError> {
    let now = sched.now();
    let dot = world.dots_mut().dot_mut(id)?;
    if !dot.active {
        dot.tick_action = None;
        return Ok(Next::Done);
    }
    let handle = dot.tick_action;
    let tick_length = dot.options.tick_length;

    resolve_tick(sched, world, id, false)?;

    // Final tick, or a hook cancelled or restarted the effect
    let dot = world.dots_mut().dot_mut(id)?;
    if !dot.active || dot.tick_action != handle {
        return Ok(Next::Done);
    }

    let next = now.saturating_add(tick_length);
    dot.next_tick_at = Some(next);
    Ok(Next::At(next))
}

fn expire_aura<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    id: DotId,
) -> Result<Next, SimError> {
    let now = sched.now();
    let dot = world.dots_mut().dot_mut(id)?;
    dot.aura_action = None;

    let missing = if dot.active {
        dot.options.number_of_ticks - dot.ticks_fired
    } else {
        0
    };

    if missing > 0 {
        if let Some(action) = dot.tick_action.take() {
            sched.cancel(action);
        }
        dot.next_tick_at = None;

        if missing > 1 {
            warn!(
                dot = %id,
                ability = %dot.ability,
                at = ?now,
                missing,
                tick_span = ?dot.options.tick_span(),
                aura = ?dot.options.aura_duration(),
                "Aura shorter than tick schedule, forcing missing ticks"
            );
        } else {
            debug!(dot = %id, ability = %dot.ability, at = ?now, "Forcing final tick at aura expiry");
        }

        for _ in 0..missing {
            resolve_tick(sched, world, id, true)?;
        }
    }

    teardown(world, id, now)?;
    Ok(Next::Done)
}

// ═══════════════════════════════════════════════════════════════════════════
// Internal
// ═══════════════════════════════════════════════════════════════════════════

/// Fire one tick and land (or launch) its result. The final tick
/// deactivates the effect.
fn resolve_tick<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    id: DotId,
    forced: bool,
) -> Result<(), SimError> {
    let now = sched.now();
    let dot = world.dots_mut().dot_mut(id)?;

    dot.ticks_fired += 1;
    let is_final = dot.ticks_fired >= dot.options.number_of_ticks;
    if is_final {
        dot.active = false;
        dot.tick_action = None;
        dot.next_tick_at = None;
    }

    let effect = Rc::clone(&dot.effect);
    let ctx = dot.context(now, forced);
    let travel = dot.options.travel_delay();

    let result = effect.on_tick(world, &ctx);
    debug!(
        dot = %id,
        ability = %ctx.ability,
        target = %ctx.target,
        at = ?now,
        tick = ctx.tick,
        outcome = %result.outcome,
        amount = result.amount,
        forced,
        "Periodic tick"
    );

    land(sched, world, result, travel)
}

fn land<W: DotHost>(
    sched: &mut Scheduler<W>,
    world: &mut W,
    result: TickResult,
    travel: Duration,
) -> Result<(), SimError> {
    let now = sched.now();
    if travel.is_zero() {
        return world.land_tick(now, &result);
    }

    let label = format!("{} travel", result.ability);
    sched.schedule(
        now.saturating_add(travel),
        Priority::TRAVEL,
        label,
        move |s: &mut Scheduler<W>, w: &mut W| {
            w.land_tick(s.now(), &result)?;
            Ok(Next::Done)
        },
    )?;
    Ok(())
}

fn teardown<W: DotHost>(world: &mut W, id: DotId, now: Duration) -> Result<(), SimError> {
    let dot = world.dots_mut().dot_mut(id)?;
    dot.active = false;
    dot.aura_active = false;
    dot.next_tick_at = None;
    dot.aura_expires_at = None;

    let effect = Rc::clone(&dot.effect);
    let ctx = dot.context(now, false);
    effect.on_expire(world, &ctx)
}

/// Move a pending action to `at`, or schedule a new one if it is gone.
fn place<W, F>(
    sched: &mut Scheduler<W>,
    existing: Option<ActionId>,
    at: Duration,
    priority: Priority,
    label: impl Into<Cow<'static, str>>,
    on_action: F,
) -> Result<ActionId, SimError>
where
    F: FnMut(&mut Scheduler<W>, &mut W) -> Result<Next, SimError> + 'static,
{
    if let Some(id) = existing {
        if sched.reschedule(id, at)? {
            return Ok(id);
        }
    }
    sched.schedule(at, priority, label, on_action)
}
