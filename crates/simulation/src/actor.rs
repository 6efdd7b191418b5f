//! Participants of a trial.

use crate::config::{ActorConfig, PoolConfig, TrialConfig};
use combatsim_resources::{ResourceBar, StatBlock};
use combatsim_types::{ActorId, ResourceError, ResourceType};
use std::time::Duration;

/// One participant: stats, resource pools and damage accounting.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    name: String,

    /// Current stats. Regen reads them at every tick.
    pub stats: StatBlock,

    /// Scales snapshot magnitudes of effects this actor applies.
    pub spell_power: f64,

    base_mana: f64,
    mana: Option<ResourceBar>,
    rage: Option<ResourceBar>,

    damage_done: f64,
    damage_taken: f64,
}

impl Actor {
    pub(crate) fn new(id: ActorId, config: &ActorConfig, trial: &TrialConfig) -> Self {
        let mut actor = Self {
            id,
            name: config.name.clone(),
            stats: config.stats.clone(),
            spell_power: config.spell_power,
            base_mana: 0.0,
            mana: None,
            rage: None,
            damage_done: 0.0,
            damage_taken: 0.0,
        };

        for pool in &config.pools {
            match *pool {
                PoolConfig::Mana { max, base } => {
                    actor.base_mana = base.unwrap_or(max);
                    actor.mana = Some(
                        ResourceBar::mana(id, max)
                            .with_active_window(trial.active_window)
                            .with_regen_interval(trial.regen_interval),
                    );
                }
                PoolConfig::Rage { max, start } => {
                    actor.rage = Some(
                        ResourceBar::rage(id, max, start).with_regen_interval(trial.regen_interval),
                    );
                }
            }
        }

        actor
    }

    /// Actor id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base mana that fractional mana costs are relative to.
    pub fn base_mana(&self) -> f64 {
        self.base_mana
    }

    /// Pool of `resource`, if the actor has one.
    pub fn bar(&self, resource: ResourceType) -> Option<&ResourceBar> {
        match resource {
            ResourceType::Mana => self.mana.as_ref(),
            ResourceType::Rage => self.rage.as_ref(),
        }
    }

    /// Pool of `resource`, failing when the actor has none.
    pub fn bar_mut(&mut self, resource: ResourceType) -> Result<&mut ResourceBar, ResourceError> {
        let bar = match resource {
            ResourceType::Mana => self.mana.as_mut(),
            ResourceType::Rage => self.rage.as_mut(),
        };
        bar.ok_or(ResourceError::MissingBar { resource })
    }

    /// Every pool the actor has.
    pub fn bars(&self) -> impl Iterator<Item = &ResourceBar> {
        self.mana.iter().chain(self.rage.iter())
    }

    /// Damage dealt by this actor's effects this iteration.
    pub fn damage_done(&self) -> f64 {
        self.damage_done
    }

    /// Damage received this iteration.
    pub fn damage_taken(&self) -> f64 {
        self.damage_taken
    }

    pub(crate) fn record_damage_done(&mut self, amount: f64) {
        self.damage_done += amount;
    }

    pub(crate) fn record_damage_taken(&mut self, amount: f64) {
        self.damage_taken += amount;
    }

    /// Apply one regen tick to every pool that regenerates on a timer.
    pub(crate) fn regen_tick(&mut self, now: Duration) -> Result<(), ResourceError> {
        for bar in self.mana.iter_mut().chain(self.rage.iter_mut()) {
            if bar.resource_type().regenerates_on_tick() {
                bar.regen_tick(now, &self.stats)?;
            }
        }
        Ok(())
    }

    pub(crate) fn done_iteration(&mut self, now: Duration) {
        for bar in self.mana.iter_mut().chain(self.rage.iter_mut()) {
            bar.done_iteration(now);
        }
    }

    pub(crate) fn reset(&mut self) {
        for bar in self.mana.iter_mut().chain(self.rage.iter_mut()) {
            bar.reset();
        }
        self.damage_done = 0.0;
        self.damage_taken = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_from_config() {
        let trial = TrialConfig::default();
        let config = ActorConfig::new("warrior").with_rage(100.0, 25.0);
        let mut actor = Actor::new(ActorId(0), &config, &trial);

        assert!(actor.bar(ResourceType::Mana).is_none());
        assert_eq!(actor.bar(ResourceType::Rage).map(|b| b.current()), Some(25.0));
        assert_eq!(
            actor.bar_mut(ResourceType::Mana).unwrap_err(),
            ResourceError::MissingBar {
                resource: ResourceType::Mana
            }
        );
        assert_eq!(actor.bars().count(), 1);
    }

    #[test]
    fn test_base_mana_defaults_to_max() {
        let trial = TrialConfig::default();
        let actor = Actor::new(ActorId(0), &ActorConfig::new("mage").with_mana(4000.0), &trial);
        assert_eq!(actor.base_mana(), 4000.0);
    }
}
