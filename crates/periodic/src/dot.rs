//! Effect instances and their registry.

use crate::effect::{DotContext, PeriodicEffect};
use crate::options::{DotOptions, RefreshPolicy};
use combatsim_core::{ActionId, SimError};
use combatsim_types::{AbilityId, ActorId, DotId};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// One periodic effect instance (one ability on one target).
///
/// Invariant: `ticks_fired <= number_of_ticks`, and the effect is active only
/// while `ticks_fired < number_of_ticks` and it has not been torn down.
pub struct Dot<W> {
    pub(crate) id: DotId,
    pub(crate) ability: AbilityId,
    pub(crate) caster: ActorId,
    pub(crate) target: ActorId,
    pub(crate) options: DotOptions,
    pub(crate) effect: Rc<dyn PeriodicEffect<W>>,

    pub(crate) active: bool,
    pub(crate) aura_active: bool,
    pub(crate) ticks_fired: u32,
    pub(crate) magnitude: f64,
    pub(crate) applied_at: Option<Duration>,
    pub(crate) next_tick_at: Option<Duration>,
    pub(crate) aura_expires_at: Option<Duration>,

    /// Pending tick action. Keeps its id across self-requeues.
    pub(crate) tick_action: Option<ActionId>,
    /// Pending aura expiry action.
    pub(crate) aura_action: Option<ActionId>,
}

impl<W> Dot<W> {
    /// Instance id.
    pub fn id(&self) -> DotId {
        self.id
    }

    /// Ability the effect belongs to.
    pub fn ability(&self) -> AbilityId {
        self.ability
    }

    /// Who applied it.
    pub fn caster(&self) -> ActorId {
        self.caster
    }

    /// Who it ticks on.
    pub fn target(&self) -> ActorId {
        self.target
    }

    /// Configuration.
    pub fn options(&self) -> &DotOptions {
        &self.options
    }

    /// Refresh policy.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.options.refresh
    }

    /// Whether ticks are still outstanding.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the bounding aura is up.
    pub fn aura_active(&self) -> bool {
        self.aura_active
    }

    /// Ticks fired in the current application.
    pub fn ticks_fired(&self) -> u32 {
        self.ticks_fired
    }

    /// Ticks left in the current application (zero when inactive).
    pub fn ticks_remaining(&self) -> u32 {
        if self.active {
            self.options.number_of_ticks - self.ticks_fired
        } else {
            0
        }
    }

    /// Ticks per application.
    pub fn number_of_ticks(&self) -> u32 {
        self.options.number_of_ticks
    }

    /// Snapshot magnitude.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// When the current application started. A restart moves it, a rollover
    /// does not.
    pub fn applied_at(&self) -> Option<Duration> {
        self.applied_at
    }

    /// When the next scheduled tick fires.
    pub fn next_tick_at(&self) -> Option<Duration> {
        self.next_tick_at
    }

    /// When the aura expires.
    pub fn aura_expires_at(&self) -> Option<Duration> {
        self.aura_expires_at
    }

    pub(crate) fn context(&self, now: Duration, forced: bool) -> DotContext {
        DotContext {
            dot: self.id,
            ability: self.ability,
            caster: self.caster,
            target: self.target,
            tick: self.ticks_fired,
            number_of_ticks: self.options.number_of_ticks,
            magnitude: self.magnitude,
            now,
            forced,
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.aura_active = false;
        self.ticks_fired = 0;
        self.magnitude = 0.0;
        self.applied_at = None;
        self.next_tick_at = None;
        self.aura_expires_at = None;
        self.tick_action = None;
        self.aura_action = None;
    }
}

impl<W> fmt::Debug for Dot<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dot")
            .field("id", &self.id)
            .field("ability", &self.ability)
            .field("target", &self.target)
            .field("active", &self.active)
            .field("aura_active", &self.aura_active)
            .field("ticks_fired", &self.ticks_fired)
            .field("magnitude", &self.magnitude)
            .finish_non_exhaustive()
    }
}

/// All effect instances of a trial, indexed by [`DotId`].
pub struct DotSet<W> {
    dots: Vec<Dot<W>>,
}

impl<W> Default for DotSet<W> {
    fn default() -> Self {
        Self { dots: Vec::new() }
    }
}

impl<W> DotSet<W> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inactive effect instance.
    pub fn register(
        &mut self,
        ability: AbilityId,
        caster: ActorId,
        target: ActorId,
        options: DotOptions,
        effect: Rc<dyn PeriodicEffect<W>>,
    ) -> Result<DotId, SimError> {
        options.validate()?;

        let id = DotId(self.dots.len() as u32);
        self.dots.push(Dot {
            id,
            ability,
            caster,
            target,
            options,
            effect,
            active: false,
            aura_active: false,
            ticks_fired: 0,
            magnitude: 0.0,
            applied_at: None,
            next_tick_at: None,
            aura_expires_at: None,
            tick_action: None,
            aura_action: None,
        });
        Ok(id)
    }

    /// Look up an instance.
    pub fn get(&self, id: DotId) -> Option<&Dot<W>> {
        self.dots.get(id.index())
    }

    /// Look up an instance, failing on unknown ids.
    pub fn dot(&self, id: DotId) -> Result<&Dot<W>, SimError> {
        self.get(id).ok_or_else(|| SimError::unknown("dot", id.0))
    }

    pub(crate) fn dot_mut(&mut self, id: DotId) -> Result<&mut Dot<W>, SimError> {
        self.dots
            .get_mut(id.index())
            .ok_or_else(|| SimError::unknown("dot", id.0))
    }

    /// Find the instance of `ability` on `target`.
    pub fn find(&self, ability: AbilityId, target: ActorId) -> Option<&Dot<W>> {
        self.dots
            .iter()
            .find(|d| d.ability == ability && d.target == target)
    }

    /// All instances in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Dot<W>> {
        self.dots.iter()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Whether no instance is registered.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Number of instances with ticks outstanding.
    pub fn active_count(&self) -> usize {
        self.dots.iter().filter(|d| d.active).count()
    }

    /// Deactivate everything for a new iteration.
    ///
    /// Pending action handles are forgotten; the scheduler is expected to be
    /// reset alongside.
    pub fn reset(&mut self) {
        for dot in &mut self.dots {
            dot.reset();
        }
    }
}

impl<W> fmt::Debug for DotSet<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.dots.iter()).finish()
    }
}
