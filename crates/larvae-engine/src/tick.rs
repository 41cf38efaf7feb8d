//! Step engine: the single-threaded simulation loop.
//!
//! [`TickEngine`] wires the ensemble, the validated propagator pipeline
//! and the environment sampler into a deterministic step loop with
//! rollback atomicity: a step either completes or leaves the ensemble
//! exactly as it found it.

use std::time::Instant;

use larvae_core::{
    Deactivation, EnvFallbacks, Ensemble, Environment, PropagatorError, StepError, StepId,
    TimeDirection,
};
use larvae_propagator::{FallbackCounts, PipelinePlan, Propagator, StepContext};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::{OutcomeTally, StepMetrics};

// ── StepReport ─────────────────────────────────────────────────────

/// Result of a successful step.
#[derive(Clone, Debug)]
pub struct StepReport {
    /// The step that just completed.
    pub step_id: StepId,
    /// Particles deactivated during the step, in the order it happened.
    pub deactivations: Vec<Deactivation>,
    /// Performance and population metrics for this step.
    pub metrics: StepMetrics,
}

// ── TickEngine ─────────────────────────────────────────────────────

/// Single-threaded step engine.
///
/// Owns all simulation state and executes steps synchronously. Each
/// [`execute_step()`](TickEngine::execute_step) samples ambient
/// temperature, runs the full propagator pipeline and returns the step's
/// deactivations.
pub struct TickEngine {
    ensemble: Ensemble,
    propagators: Vec<Box<dyn Propagator>>,
    plan: PipelinePlan,
    environment: Box<dyn Environment>,
    fallbacks: EnvFallbacks,
    dt: f64,
    current_step: StepId,
    consecutive_rollback_count: u32,
    step_disabled: bool,
    max_consecutive_rollbacks: u32,
    rollback_events: u64,
    step_disabled_transitions: u64,
    tally: OutcomeTally,
    last_metrics: StepMetrics,
}

impl TickEngine {
    /// Construct a step engine over `ensemble`.
    ///
    /// Validates the pipeline (ordering, write conflicts, dt) and keeps
    /// the resulting plan for per-step output checks.
    pub fn new(config: EngineConfig, ensemble: Ensemble) -> Result<Self, ConfigError> {
        let plan = config.validate()?;
        tracing::info!(
            stages = ?plan.names(),
            dt = config.dt,
            particles = ensemble.len(),
            "step engine ready"
        );
        Ok(Self {
            ensemble,
            propagators: config.propagators,
            plan,
            environment: config.environment,
            fallbacks: config.fallbacks,
            dt: config.dt,
            current_step: StepId(0),
            consecutive_rollback_count: 0,
            step_disabled: false,
            max_consecutive_rollbacks: 3,
            rollback_events: 0,
            step_disabled_transitions: 0,
            tally: OutcomeTally::new(),
            last_metrics: StepMetrics::default(),
        })
    }

    /// Execute one step.
    ///
    /// A zero timestep or an ensemble with no active particle is a no-op
    /// that still advances the step counter. On a propagator failure (or a
    /// non-finite value left in a column the propagator writes) the ensemble
    /// is restored to its state at the start of the step.
    pub fn execute_step(&mut self) -> Result<StepReport, StepError> {
        if self.step_disabled {
            return Err(StepError::StepDisabled {
                failures: self.consecutive_rollback_count,
            });
        }

        let step_start = Instant::now();
        let next_step = self.current_step.next();
        let active_before = self.ensemble.active_count();

        if TimeDirection::of(self.dt) == TimeDirection::Stationary || active_before == 0 {
            self.current_step = next_step;
            self.consecutive_rollback_count = 0;
            let metrics = self.build_metrics(
                step_start,
                Vec::new(),
                active_before,
                0,
                FallbackCounts::default(),
            );
            tracing::trace!(step = %next_step, active = active_before, "no-op step");
            return Ok(StepReport {
                step_id: next_step,
                deactivations: Vec::new(),
                metrics,
            });
        }

        // 1. Checkpoint for rollback.
        let checkpoint = self.ensemble.clone();

        // 2. Sample ambient temperature, then run the pipeline.
        let mut deactivations = Vec::new();
        let mut propagator_us = Vec::with_capacity(self.propagators.len());
        let result = {
            let columns = self.ensemble.columns_mut(&mut deactivations);
            let mut ctx = StepContext::new(
                columns,
                self.environment.as_ref(),
                self.fallbacks,
                next_step,
                self.dt,
            );
            ctx.sample_ambient_temperature();
            run_pipeline(&self.propagators, &self.plan, &mut ctx, &mut propagator_us)
                .map(|()| ctx.fallback_counts())
        };

        let fallbacks = match result {
            Ok(fallbacks) => fallbacks,
            Err((name, reason)) => {
                self.ensemble = checkpoint;
                return self.handle_rollback(next_step, name, reason);
            }
        };

        // 3. Commit.
        self.current_step = next_step;
        self.consecutive_rollback_count = 0;
        self.tally.record_all(&deactivations);

        if fallbacks.total() > 0 {
            tracing::debug!(
                step = %next_step,
                temperature = fallbacks.temperature,
                seafloor_depth = fallbacks.seafloor_depth,
                "environment fallbacks used"
            );
        }

        let metrics = self.build_metrics(
            step_start,
            propagator_us,
            active_before,
            deactivations.len(),
            fallbacks,
        );
        tracing::debug!(
            step = %next_step,
            active = metrics.active_after,
            deactivated = metrics.deactivations,
            total_us = metrics.total_us,
            "step complete"
        );

        Ok(StepReport {
            step_id: next_step,
            deactivations,
            metrics,
        })
    }

    fn build_metrics(
        &mut self,
        step_start: Instant,
        propagator_us: Vec<(String, u64)>,
        active_before: usize,
        deactivations: usize,
        fallbacks: FallbackCounts,
    ) -> StepMetrics {
        let metrics = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            propagator_us,
            active_before,
            active_after: self.ensemble.active_count(),
            deactivations,
            temperature_fallbacks: fallbacks.temperature,
            seafloor_fallbacks: fallbacks.seafloor_depth,
            rollback_events: self.rollback_events,
            step_disabled_transitions: self.step_disabled_transitions,
        };
        self.last_metrics = metrics.clone();
        metrics
    }

    /// Record a failed step. The caller has already restored the ensemble.
    fn handle_rollback(
        &mut self,
        step: StepId,
        name: String,
        reason: PropagatorError,
    ) -> Result<StepReport, StepError> {
        self.consecutive_rollback_count += 1;
        self.rollback_events += 1;
        tracing::warn!(
            step = %step,
            propagator = %name,
            error = %reason,
            consecutive = self.consecutive_rollback_count,
            "step rolled back"
        );
        if self.consecutive_rollback_count >= self.max_consecutive_rollbacks {
            self.step_disabled = true;
            self.step_disabled_transitions += 1;
            tracing::warn!(
                failures = self.consecutive_rollback_count,
                "stepping disabled after consecutive rollbacks"
            );
        }
        Err(StepError::PropagatorFailed { name, reason })
    }

    /// Replace the ensemble and return the engine to step zero.
    ///
    /// Clears the step-disabled state, the rollback counter and the tally.
    pub fn reset(&mut self, ensemble: Ensemble) {
        self.ensemble = ensemble;
        self.current_step = StepId(0);
        self.step_disabled = false;
        self.consecutive_rollback_count = 0;
        self.tally = OutcomeTally::new();
        self.last_metrics = StepMetrics::default();
    }

    /// The particle ensemble as of the last completed step.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Last completed step.
    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    /// Signed timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Whether stepping is disabled due to consecutive rollbacks.
    pub fn is_step_disabled(&self) -> bool {
        self.step_disabled
    }

    /// Number of consecutive rollbacks since the last successful step.
    pub fn consecutive_rollback_count(&self) -> u32 {
        self.consecutive_rollback_count
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Outcomes counted since construction (or the last reset).
    pub fn tally(&self) -> &OutcomeTally {
        &self.tally
    }

    /// The validated pipeline plan.
    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }
}

/// Run every stage in order, checking each stage's numeric outputs.
fn run_pipeline(
    propagators: &[Box<dyn Propagator>],
    plan: &PipelinePlan,
    ctx: &mut StepContext<'_>,
    timings: &mut Vec<(String, u64)>,
) -> Result<(), (String, PropagatorError)> {
    for (i, prop) in propagators.iter().enumerate() {
        let prop_start = Instant::now();
        prop.step(ctx)
            .map_err(|reason| (prop.name().to_string(), reason))?;

        let written = plan.writes_of(i);
        for column in written.iter() {
            if let Some(particle) = ctx.columns_ref().first_non_finite(column) {
                return Err((
                    prop.name().to_string(),
                    PropagatorError::NanDetected {
                        column,
                        particle: Some(particle),
                    },
                ));
            }
        }

        timings.push((
            prop.name().to_string(),
            prop_start.elapsed().as_micros() as u64,
        ));
    }
    Ok(())
}
