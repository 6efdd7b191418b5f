//! Trial runner.

use crate::config::TrialConfig;
use crate::parallel::iteration_seed;
use crate::report::{SimulationStats, TrialReport};
use crate::rotation::{Rotation, SwingTimer};
use crate::state::TrialState;
use combatsim_core::{Next, Scheduler, SimError};
use combatsim_types::Priority;
use std::time::Duration;
use tracing::info;

/// One configured encounter that can be run for any number of iterations.
///
/// Every iteration starts from the same initial state: the scheduler is
/// emptied and rewound, pools refill, effects deactivate and the random
/// stream is reseeded.
pub struct Trial {
    config: TrialConfig,
    sched: Scheduler<TrialState>,
    state: TrialState,
    rotations: Vec<Rotation>,
    swings: Vec<SwingTimer>,
}

impl Trial {
    /// Trial over a fully registered world.
    pub fn new(state: TrialState) -> Self {
        Self {
            config: state.config().clone(),
            sched: Scheduler::new(),
            state,
            rotations: Vec::new(),
            swings: Vec::new(),
        }
    }

    /// Drive an actor with a rotation.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotations.push(rotation);
        self
    }

    /// Generate rage from melee swings.
    pub fn with_swing_timer(mut self, swing: SwingTimer) -> Self {
        self.swings.push(swing);
        self
    }

    /// Configuration.
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// World as left by the last iteration.
    pub fn state(&self) -> &TrialState {
        &self.state
    }

    /// Scheduler as left by the last iteration.
    pub fn scheduler(&self) -> &Scheduler<TrialState> {
        &self.sched
    }

    /// Run one iteration with the configured seed.
    pub fn run(&mut self) -> Result<TrialReport, SimError> {
        self.run_seeded(self.config.seed)
    }

    /// Run `iterations` sequential iterations with seeds derived from the
    /// configured one.
    pub fn run_iterations(&mut self, iterations: u64) -> Result<SimulationStats, SimError> {
        let base = self.config.seed;
        let reports = (0..iterations)
            .map(|i| self.run_seeded(iteration_seed(base, i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SimulationStats::from_reports(&reports))
    }

    /// Run one iteration with `seed`.
    pub fn run_seeded(&mut self, seed: u64) -> Result<TrialReport, SimError> {
        self.sched.reset();
        self.state.reset(seed);
        self.install()?;

        info!(seed, duration = ?self.config.duration, "Trial started");

        let summary = self.sched.advance(&mut self.state)?;
        self.state.done_iteration(summary.now);

        let report = TrialReport::collect(seed, summary.now, self.sched.fired(), &self.state);
        info!(
            seed,
            fired = report.actions_fired,
            damage = report.total_damage,
            dps = report.dps(),
            starved = ?report.total_starved(),
            "Trial finished"
        );
        Ok(report)
    }

    fn install(&mut self) -> Result<(), SimError> {
        for rotation in &self.rotations {
            rotation.validate()?;
        }
        for swing in &self.swings {
            swing.validate()?;
        }

        let interval = self.config.regen_interval;
        self.sched.schedule(
            interval,
            Priority::REGEN,
            "regen",
            move |s: &mut Scheduler<TrialState>, w: &mut TrialState| {
                w.regen_tick(s.now())?;
                Ok(Next::At(s.now().saturating_add(interval)))
            },
        )?;

        for swing in &self.swings {
            let swing = *swing;
            self.sched.schedule(
                swing.interval,
                Priority::AUTO_ATTACK,
                format!("swing {}", swing.actor),
                move |s: &mut Scheduler<TrialState>, w: &mut TrialState| swing.swing(s, w),
            )?;
        }

        for rotation in &self.rotations {
            let rotation = rotation.clone();
            self.sched.schedule(
                Duration::ZERO,
                Priority::GCD,
                format!("rotation {}", rotation.caster),
                move |s: &mut Scheduler<TrialState>, w: &mut TrialState| rotation.step(s, w),
            )?;
        }

        self.sched.schedule_end(self.config.duration)?;
        Ok(())
    }
}
