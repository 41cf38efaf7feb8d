//! Execution context passed to propagators during step execution.
//!
//! [`StepContext`] bundles the mutable ensemble columns with the
//! environment sampler, the signed timestep and the step id. Environment
//! lookups go through the context so that fallback substitutions are
//! counted in one place.

use larvae_core::{ColumnsMut, EnvFallbacks, Environment, StepId, TimeDirection};

/// How many environment samples fell back to configured defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FallbackCounts {
    /// Temperature samples replaced by the fallback temperature.
    pub temperature: u64,
    /// Seafloor depth samples replaced by the fallback depth.
    pub seafloor_depth: u64,
}

impl FallbackCounts {
    /// Total substitutions of either kind.
    pub fn total(&self) -> u64 {
        self.temperature + self.seafloor_depth
    }
}

/// Execution context passed to each propagator's `step()` method.
///
/// Uses dynamic dispatch (`&dyn Environment`) to keep the
/// [`Propagator`](crate::Propagator) trait object-safe while supporting
/// mock environments in tests.
pub struct StepContext<'a> {
    columns: ColumnsMut<'a>,
    environment: &'a dyn Environment,
    fallbacks: EnvFallbacks,
    step_id: StepId,
    dt: f64,
    fallback_counts: FallbackCounts,
}

impl<'a> StepContext<'a> {
    /// Construct a new step context.
    ///
    /// Typically called by the engine, not by propagators directly.
    pub fn new(
        columns: ColumnsMut<'a>,
        environment: &'a dyn Environment,
        fallbacks: EnvFallbacks,
        step_id: StepId,
        dt: f64,
    ) -> Self {
        Self {
            columns,
            environment,
            fallbacks,
            step_id,
            dt,
            fallback_counts: FallbackCounts::default(),
        }
    }

    /// Mutable access to every ensemble column.
    pub fn columns(&mut self) -> &mut ColumnsMut<'a> {
        &mut self.columns
    }

    /// Read-only view of the columns.
    pub fn columns_ref(&self) -> &ColumnsMut<'a> {
        &self.columns
    }

    /// Sea-water temperature at a point, with fallback substitution.
    pub fn sample_temperature(&mut self, lon: f64, lat: f64, z: f64) -> f64 {
        let sample = self
            .fallbacks
            .temperature(self.environment.sea_water_temperature(lon, lat, z));
        if sample.fallback {
            self.fallback_counts.temperature += 1;
        }
        sample.value
    }

    /// Seafloor depth (positive metres) at a point, with fallback
    /// substitution.
    pub fn sample_seafloor_depth(&mut self, lon: f64, lat: f64) -> f64 {
        let sample = self
            .fallbacks
            .seafloor_depth(self.environment.sea_floor_depth(lon, lat));
        if sample.fallback {
            self.fallback_counts.seafloor_depth += 1;
        }
        sample.value
    }

    /// Refresh the temperature column for every active particle.
    pub fn sample_ambient_temperature(&mut self) {
        for i in 0..self.columns.len() {
            if !self.columns.is_active(i) {
                continue;
            }
            let (lon, lat, z) = (self.columns.lon[i], self.columns.lat[i], self.columns.z[i]);
            let t = self.sample_temperature(lon, lat, z);
            self.columns.temperature[i] = t;
        }
    }

    /// Environment substitutions made so far in this step.
    pub fn fallback_counts(&self) -> FallbackCounts {
        self.fallback_counts
    }

    /// Current step id.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Signed timestep in seconds. Negative in reverse-time runs.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Direction of time for this step.
    pub fn direction(&self) -> TimeDirection {
        TimeDirection::of(self.dt)
    }
}
