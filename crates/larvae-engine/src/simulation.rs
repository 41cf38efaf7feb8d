//! Synchronous, owned simulation handle.
//!
//! [`Simulation`] is the user-facing API: build it from a [`RunConfig`],
//! a host transport and an environment, then call
//! [`step()`](Simulation::step) once per timestep.
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] (it can be moved to a worker thread) but not
//! [`Sync`]. All mutating methods take `&mut self`, and the ensemble is
//! only readable between steps.

use larvae_core::{Ensemble, Environment, StepError, StepId, Transport};

use crate::config::{ConfigError, EngineConfig, RunConfig};
use crate::metrics::{OutcomeTally, StepMetrics};
use crate::tick::{StepReport, TickEngine};

// Compile-time assertion: Simulation is Send.
// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

/// Single-threaded larval development and settlement run.
pub struct Simulation {
    engine: TickEngine,
    run: Option<RunConfig>,
}

impl Simulation {
    /// Build the standard pipeline for `run` and wrap it around `ensemble`.
    pub fn new(
        run: RunConfig,
        ensemble: Ensemble,
        transport: Box<dyn Transport>,
        environment: Box<dyn Environment>,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig::from_run(&run, transport, environment)?;
        Ok(Self {
            engine: TickEngine::new(config, ensemble)?,
            run: Some(run),
        })
    }

    /// Wrap a hand-assembled pipeline.
    pub fn from_engine_config(
        config: EngineConfig,
        ensemble: Ensemble,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: TickEngine::new(config, ensemble)?,
            run: None,
        })
    }

    /// Advance one timestep.
    pub fn step(&mut self) -> Result<StepReport, StepError> {
        self.engine.execute_step()
    }

    /// Advance `steps` timesteps, stopping at the first error.
    ///
    /// Returns every report in order.
    pub fn run_for(&mut self, steps: u64) -> Result<Vec<StepReport>, StepError> {
        (0..steps).map(|_| self.step()).collect()
    }

    /// Step until no particle is active or `max_steps` have run.
    ///
    /// Returns the number of steps executed.
    pub fn run_until_inactive(&mut self, max_steps: u64) -> Result<u64, StepError> {
        let mut steps = 0;
        while steps < max_steps && self.engine.ensemble().active_count() > 0 {
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// The particle ensemble as of the last completed step.
    pub fn ensemble(&self) -> &Ensemble {
        self.engine.ensemble()
    }

    /// Last completed step.
    pub fn current_step(&self) -> StepId {
        self.engine.current_step()
    }

    /// Elapsed model time in seconds, signed like the timestep.
    pub fn elapsed_seconds(&self) -> f64 {
        self.engine.current_step().0 as f64 * self.engine.dt()
    }

    /// Whether stepping is disabled due to consecutive rollbacks.
    pub fn is_step_disabled(&self) -> bool {
        self.engine.is_step_disabled()
    }

    /// Number of consecutive rollbacks since the last successful step.
    pub fn consecutive_rollback_count(&self) -> u32 {
        self.engine.consecutive_rollback_count()
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }

    /// Outcomes counted so far.
    pub fn tally(&self) -> &OutcomeTally {
        self.engine.tally()
    }

    /// The run configuration, when built with [`Simulation::new`].
    pub fn run_config(&self) -> Option<&RunConfig> {
        self.run.as_ref()
    }

    /// Replace the ensemble and start again from step zero.
    pub fn reset(&mut self, ensemble: Ensemble) {
        self.engine.reset(ensemble);
    }
}
