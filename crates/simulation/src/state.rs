//! The world a trial's actions operate on.

use crate::actor::Actor;
use crate::config::{ActorConfig, TrialConfig};
use crate::outcome::OutcomeResolver;
use combatsim_core::{Scheduler, SimError};
use combatsim_periodic::{self as periodic, ApplyOutcome, DotHost, DotOptions, DotSet, PeriodicEffect};
use combatsim_resources::{CostOptions, CostStrategy};
use combatsim_types::{
    AbilityId, ActorId, Cause, DotId, HitOutcome, ResourceError, ResourceType, TickResult, NEVER,
};
use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// An ability known by one actor.
#[derive(Debug)]
pub struct Ability {
    id: AbilityId,
    name: String,
    caster: ActorId,
    cost: Option<Box<dyn CostStrategy>>,
    rolls_application: bool,
}

impl Ability {
    /// Ability id.
    pub fn id(&self) -> AbilityId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Actor that knows the ability.
    pub fn caster(&self) -> ActorId {
        self.caster
    }

    /// Cost strategy; `None` for free abilities.
    pub fn cost(&self) -> Option<&dyn CostStrategy> {
        self.cost.as_deref()
    }

    /// Cost strategy, mutably (for external multiplier changes).
    pub fn cost_mut(&mut self) -> Option<&mut (dyn CostStrategy + 'static)> {
        self.cost.as_deref_mut()
    }

    /// Whether a cast rolls hit/miss before its effect is applied.
    pub fn rolls_application(&self) -> bool {
        self.rolls_application
    }

    /// Roll hit/miss on every cast. A miss skips the effect and issues the
    /// cost's refund.
    pub fn set_rolls_application(&mut self, rolls: bool) {
        self.rolls_application = rolls;
    }
}

/// Result of a cast attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// Paid for. Carries what happened to the ability's effect, if it has
    /// one on the target.
    Cast(Option<ApplyOutcome>),
    /// Paid for, but the running effect refused the re-application; part of
    /// the cost may have been returned.
    Rejected { refunded: f64 },
    /// Paid for, but the application roll missed: no effect was applied and
    /// part of the cost may have been returned.
    Avoided { refunded: f64 },
    /// Not affordable. Carries the diagnostic.
    Insufficient(String),
}

impl CastOutcome {
    /// Whether the cost was paid.
    pub fn paid(&self) -> bool {
        !matches!(self, CastOutcome::Insufficient(_))
    }
}

/// Per-ability damage accounting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageTally {
    /// Ticks landed (including misses).
    pub ticks: u64,
    /// Normal hits.
    pub hits: u64,
    /// Critical hits.
    pub crits: u64,
    /// Misses.
    pub misses: u64,
    /// Total damage.
    pub total: f64,
}

impl DamageTally {
    fn record(&mut self, outcome: HitOutcome, amount: f64) {
        self.ticks += 1;
        match outcome {
            HitOutcome::Miss => self.misses += 1,
            HitOutcome::Hit => self.hits += 1,
            HitOutcome::Crit => self.crits += 1,
        }
        self.total += amount;
    }
}

/// Cast attempt counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastCounters {
    /// Casts whose cost was paid.
    pub paid: u64,
    /// Attempts that could not be afforded.
    pub insufficient: u64,
    /// Paid casts whose effect application was rejected.
    pub rejected: u64,
    /// Paid casts whose application roll missed.
    pub avoided: u64,
}

/// Trial world: actors, abilities, effects, randomness and accounting.
#[derive(Debug)]
pub struct TrialState {
    config: TrialConfig,
    actors: Vec<Actor>,
    abilities: IndexMap<AbilityId, Ability>,
    dots: DotSet<TrialState>,
    rng: ChaCha8Rng,
    resolver: Box<dyn OutcomeResolver>,
    damage: IndexMap<AbilityId, DamageTally>,
    casts: CastCounters,
}

impl TrialState {
    /// Empty world for trials configured by `config`.
    pub fn new(config: TrialConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            resolver: Box::new(config.outcomes.clone()),
            config,
            actors: Vec::new(),
            abilities: IndexMap::new(),
            dots: DotSet::new(),
            damage: IndexMap::new(),
            casts: CastCounters::default(),
        })
    }

    /// Replace the hit/crit resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn OutcomeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Configuration.
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Add an actor.
    pub fn add_actor(&mut self, config: &ActorConfig) -> ActorId {
        let id = ActorId(self.actors.len() as u32);
        self.actors.push(Actor::new(id, config, &self.config));
        id
    }

    /// Teach `caster` an ability. `cost` of `None` makes it free.
    pub fn add_ability(
        &mut self,
        caster: ActorId,
        id: AbilityId,
        name: impl Into<String>,
        cost: Option<&CostOptions>,
    ) -> Result<(), SimError> {
        if self.abilities.contains_key(&id) {
            return Err(SimError::InvalidConfig {
                what: id.to_string(),
                reason: "ability registered twice".to_string(),
            });
        }

        let actor = self.actor(caster)?;
        let cost = match cost {
            Some(options) => {
                if actor.bar(options.resource_type()).is_none() {
                    return Err(ResourceError::MissingBar {
                        resource: options.resource_type(),
                    }
                    .into());
                }
                Some(options.build(id, actor.base_mana())?)
            }
            None => None,
        };

        self.abilities.insert(
            id,
            Ability {
                id,
                name: name.into(),
                caster,
                cost,
                rolls_application: false,
            },
        );
        Ok(())
    }

    /// Give `ability` a periodic effect on `target`.
    pub fn add_dot(
        &mut self,
        ability: AbilityId,
        target: ActorId,
        options: DotOptions,
        effect: Rc<dyn PeriodicEffect<TrialState>>,
    ) -> Result<DotId, SimError> {
        self.actor(target)?;
        let caster = self.ability(ability)?.caster;
        self.dots.register(ability, caster, target, options, effect)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Look up an actor.
    pub fn actor(&self, id: ActorId) -> Result<&Actor, SimError> {
        self.actors
            .get(id.index())
            .ok_or_else(|| SimError::unknown("actor", id.0))
    }

    /// Look up an actor, mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor, SimError> {
        self.actors
            .get_mut(id.index())
            .ok_or_else(|| SimError::unknown("actor", id.0))
    }

    /// All actors.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Look up an ability.
    pub fn ability(&self, id: AbilityId) -> Result<&Ability, SimError> {
        self.abilities
            .get(&id)
            .ok_or_else(|| SimError::unknown("ability", id.id))
    }

    /// Look up an ability, mutably.
    pub fn ability_mut(&mut self, id: AbilityId) -> Result<&mut Ability, SimError> {
        self.abilities
            .get_mut(&id)
            .ok_or_else(|| SimError::unknown("ability", id.id))
    }

    /// Damage per ability this iteration, in first-landed order.
    pub fn damage_by_ability(&self) -> &IndexMap<AbilityId, DamageTally> {
        &self.damage
    }

    /// Total damage this iteration.
    pub fn total_damage(&self) -> f64 {
        self.damage.values().map(|t| t.total).sum()
    }

    /// Cast attempt counters this iteration.
    pub fn casts(&self) -> CastCounters {
        self.casts
    }

    /// Estimated wait until `ability` is affordable through regen alone.
    /// Zero for free abilities; [`NEVER`] when regen cannot get there.
    pub fn time_until_affordable(&self, now: Duration, ability: AbilityId) -> Result<Duration, SimError> {
        let ability = self.ability(ability)?;
        let Some(cost) = ability.cost() else {
            return Ok(Duration::ZERO);
        };

        let actor = self.actor(ability.caster)?;
        Ok(match actor.bar(cost.resource_type()) {
            Some(bar) => bar.time_until(now, cost.current_cost(), &actor.stats),
            None => NEVER,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Actions
    // ═══════════════════════════════════════════════════════════════════════

    /// Attempt to cast `ability` from `caster` at `target` now.
    ///
    /// Checks and pays the cost, then applies the ability's effect on the
    /// target if it has one. Abilities that roll their application skip the
    /// effect on a miss. A miss or a rejected re-application issues the
    /// cost's refund.
    pub fn cast(
        &mut self,
        sched: &mut Scheduler<Self>,
        caster: ActorId,
        ability: AbilityId,
        target: ActorId,
    ) -> Result<CastOutcome, SimError> {
        let now = sched.now();
        self.actor(target)?;
        let dot = self.dots.find(ability, target).map(|d| d.id());

        let entry = self
            .abilities
            .get_mut(&ability)
            .ok_or_else(|| SimError::unknown("ability", ability.id))?;
        if entry.caster != caster {
            return Err(SimError::InvalidConfig {
                what: ability.to_string(),
                reason: format!("not known by {caster}"),
            });
        }

        if let Some(cost) = entry.cost.as_mut() {
            let actor = self
                .actors
                .get_mut(caster.index())
                .ok_or_else(|| SimError::unknown("actor", caster.0))?;
            let bar = actor.bar_mut(cost.resource_type())?;

            if !cost.meets_requirement(now, bar) {
                let reason = cost.insufficient_reason(bar);
                debug!(actor = %caster, ability = %ability, at = ?now, reason = %reason, "Cast failed");
                self.casts.insufficient += 1;
                return Ok(CastOutcome::Insufficient(reason));
            }
            cost.spend(now, bar)?;
        }
        let rolls_application = entry.rolls_application;

        self.casts.paid += 1;
        debug!(actor = %caster, ability = %ability, target = %target, at = ?now, "Cast");

        if rolls_application && self.roll() == HitOutcome::Miss {
            self.casts.avoided += 1;
            let refunded = self.refund(now, ability)?;
            debug!(actor = %caster, ability = %ability, at = ?now, refunded, "Cast avoided");
            return Ok(CastOutcome::Avoided { refunded });
        }

        let Some(dot) = dot else {
            return Ok(CastOutcome::Cast(None));
        };

        match periodic::apply(sched, self, dot)? {
            ApplyOutcome::Rejected => {
                self.casts.rejected += 1;
                let refunded = self.refund(now, ability)?;
                Ok(CastOutcome::Rejected { refunded })
            }
            applied => Ok(CastOutcome::Cast(Some(applied))),
        }
    }

    /// Give `amount` of `resource` to `actor`, attributed to `cause`.
    pub fn grant(
        &mut self,
        now: Duration,
        actor: ActorId,
        resource: ResourceType,
        amount: f64,
        cause: Cause,
    ) -> Result<f64, SimError> {
        let bar = self.actor_mut(actor)?.bar_mut(resource)?;
        Ok(bar.add(now, amount, cause)?)
    }

    /// Roll a hit/crit outcome from the trial's random stream.
    pub fn roll(&mut self) -> HitOutcome {
        self.resolver.roll(&mut self.rng)
    }

    /// Amount that lands for `base` under `outcome`.
    pub fn scale(&self, outcome: HitOutcome, base: f64) -> f64 {
        self.resolver.scale(outcome, base)
    }

    pub(crate) fn regen_tick(&mut self, now: Duration) -> Result<(), SimError> {
        for actor in &mut self.actors {
            actor.regen_tick(now)?;
        }
        Ok(())
    }

    fn refund(&mut self, now: Duration, ability: AbilityId) -> Result<f64, SimError> {
        let entry = self
            .abilities
            .get_mut(&ability)
            .ok_or_else(|| SimError::unknown("ability", ability.id))?;
        let Some(cost) = entry.cost.as_mut() else {
            return Ok(0.0);
        };

        let caster = entry.caster;
        let actor = self
            .actors
            .get_mut(caster.index())
            .ok_or_else(|| SimError::unknown("actor", caster.0))?;
        let bar = actor.bar_mut(cost.resource_type())?;
        Ok(cost.issue_refund(now, bar)?)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Iteration lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Close open starvation intervals at the iteration end.
    pub(crate) fn done_iteration(&mut self, now: Duration) {
        for actor in &mut self.actors {
            actor.done_iteration(now);
        }
    }

    /// Restore every component for a new iteration seeded with `seed`.
    pub(crate) fn reset(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        for actor in &mut self.actors {
            actor.reset();
        }
        self.dots.reset();
        self.damage.clear();
        self.casts = CastCounters::default();
    }
}

impl DotHost for TrialState {
    fn dots(&self) -> &DotSet<Self> {
        &self.dots
    }

    fn dots_mut(&mut self) -> &mut DotSet<Self> {
        &mut self.dots
    }

    fn land_tick(&mut self, now: Duration, result: &TickResult) -> Result<(), SimError> {
        let caster = self.dots.dot(result.dot)?.caster();

        self.actor_mut(result.target)?.record_damage_taken(result.amount);
        self.actor_mut(caster)?.record_damage_done(result.amount);
        self.damage
            .entry(result.ability)
            .or_default()
            .record(result.outcome, result.amount);

        debug!(
            ability = %result.ability,
            target = %result.target,
            at = ?now,
            tick = result.tick,
            outcome = %result.outcome,
            amount = result.amount,
            "Tick landed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::SnapshotDot;
    use crate::outcome::ChanceResolver;
    use combatsim_periodic::RefreshPolicy;
    use tracing_test::traced_test;

    const REND: AbilityId = AbilityId::new(772);
    const FIREBALL: AbilityId = AbilityId::new(133);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    /// Warrior with 30 rage and a rejecting Rend, plus a mage and a target.
    fn world() -> (TrialState, ActorId, ActorId, ActorId) {
        let mut state = TrialState::new(TrialConfig::default()).unwrap();
        let warrior = state.add_actor(&ActorConfig::new("warrior").with_rage(100.0, 30.0));
        let mage = state.add_actor(
            &ActorConfig::new("mage")
                .with_mana(100.0)
                .with_spell_power(50.0),
        );
        let target = state.add_actor(&ActorConfig::new("target"));

        let rend = CostOptions::Rage {
            cost: 10.0,
            refund: 0.8,
            multiplier: None,
        };
        state.add_ability(warrior, REND, "Rend", Some(&rend)).unwrap();
        state
            .add_dot(
                REND,
                target,
                DotOptions::new(5, secs(3)).with_refresh(RefreshPolicy::Reject),
                Rc::new(SnapshotDot::new(20.0, 0.0)),
            )
            .unwrap();

        let fireball = CostOptions::Mana {
            base_cost: 0.0,
            flat_cost: 70.0,
            multiplier: None,
        };
        state.add_ability(mage, FIREBALL, "Fireball", Some(&fireball)).unwrap();

        (state, warrior, mage, target)
    }

    #[traced_test]
    #[test]
    fn test_rejected_application_is_refunded() {
        let (mut state, warrior, _, target) = world();
        let mut sched = Scheduler::new();

        let first = state.cast(&mut sched, warrior, REND, target).unwrap();
        assert_eq!(first, CastOutcome::Cast(Some(ApplyOutcome::Applied)));

        let second = state.cast(&mut sched, warrior, REND, target).unwrap();
        assert_eq!(second, CastOutcome::Rejected { refunded: 8.0 });

        let rage = state.actor(warrior).unwrap().bar(ResourceType::Rage).unwrap();
        assert_eq!(rage.current(), 18.0);
        assert_eq!(
            state.casts(),
            CastCounters {
                paid: 2,
                insufficient: 0,
                rejected: 1,
                avoided: 0,
            }
        );
    }

    #[traced_test]
    #[test]
    fn test_avoided_application_is_refunded_without_effect() {
        let (state, warrior, _, target) = world();
        let mut state = state.with_resolver(Box::new(ChanceResolver::new(0.0, 0.0)));
        state.ability_mut(REND).unwrap().set_rolls_application(true);
        let mut sched = Scheduler::new();

        let outcome = state.cast(&mut sched, warrior, REND, target).unwrap();
        assert_eq!(outcome, CastOutcome::Avoided { refunded: 8.0 });
        assert!(outcome.paid());

        let rage = state.actor(warrior).unwrap().bar(ResourceType::Rage).unwrap();
        assert_eq!(rage.current(), 28.0);
        assert!(!state.dots().find(REND, target).unwrap().is_active());
        assert!(sched.is_empty());
        assert_eq!(state.casts().avoided, 1);
        assert_eq!(state.casts().paid, 1);
    }

    #[traced_test]
    #[test]
    fn test_landed_application_roll_applies_effect() {
        let (mut state, warrior, _, target) = world();
        state.ability_mut(REND).unwrap().set_rolls_application(true);
        let mut sched = Scheduler::new();

        // Default resolver always hits
        let outcome = state.cast(&mut sched, warrior, REND, target).unwrap();
        assert_eq!(outcome, CastOutcome::Cast(Some(ApplyOutcome::Applied)));
        assert_eq!(state.casts().avoided, 0);
        assert!(state.dots().find(REND, target).unwrap().is_active());
    }

    #[traced_test]
    #[test]
    fn test_insufficient_cast_marks_starvation() {
        let (mut state, _, mage, target) = world();
        let mut sched = Scheduler::new();

        assert!(state.cast(&mut sched, mage, FIREBALL, target).unwrap().paid());
        let outcome = state.cast(&mut sched, mage, FIREBALL, target).unwrap();
        assert_eq!(
            outcome,
            CastOutcome::Insufficient("not enough mana (current = 30.000, cost = 70.000)".to_string())
        );

        let mana = state.actor(mage).unwrap().bar(ResourceType::Mana).unwrap();
        assert!(mana.is_starved());
        assert_eq!(state.casts().insufficient, 1);
        assert!(logs_contain("Cast failed"));
    }

    #[traced_test]
    #[test]
    fn test_time_until_affordable() {
        let (mut state, _, mage, target) = world();
        let mut sched = Scheduler::new();
        state.cast(&mut sched, mage, FIREBALL, target).unwrap();

        // 30 mana left, need 40 more. Nothing while active (5s), then 7.5/s.
        let wait = state.time_until_affordable(Duration::ZERO, FIREBALL).unwrap();
        assert!(wait > Duration::from_millis(10_333) && wait < Duration::from_millis(10_334));
    }

    #[traced_test]
    #[test]
    fn test_lookup_errors() {
        let (mut state, warrior, mage, target) = world();
        let mut sched = Scheduler::new();

        let unknown = state.cast(&mut sched, mage, AbilityId::new(1), target).unwrap_err();
        assert!(matches!(unknown, SimError::Unknown { kind: "ability", .. }));

        let wrong_caster = state.cast(&mut sched, mage, REND, target).unwrap_err();
        assert!(matches!(wrong_caster, SimError::InvalidConfig { .. }));

        let missing = CostOptions::Mana {
            base_cost: 0.1,
            flat_cost: 0.0,
            multiplier: None,
        };
        let err = state
            .add_ability(warrior, AbilityId::new(2), "Heal", Some(&missing))
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::Resource(ResourceError::MissingBar {
                resource: ResourceType::Mana
            })
        ));
    }

    #[traced_test]
    #[test]
    fn test_landed_ticks_are_attributed() {
        let (mut state, warrior, _, target) = world();
        let mut sched = Scheduler::new();
        state.cast(&mut sched, warrior, REND, target).unwrap();
        sched.run_until(&mut state, secs(6)).unwrap();

        let tally = &state.damage_by_ability()[&REND];
        assert_eq!(tally.ticks, 2);
        assert_eq!(tally.hits, 2);
        assert_eq!(tally.total, 40.0);
        assert_eq!(state.actor(warrior).unwrap().damage_done(), 40.0);
        assert_eq!(state.actor(target).unwrap().damage_taken(), 40.0);
        assert_eq!(state.total_damage(), 40.0);
    }
}
