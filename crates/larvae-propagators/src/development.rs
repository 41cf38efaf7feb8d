//! Development clock propagator.
//!
//! Advances each active larva's development level by `dt * rate(stage, T)`
//! and ratchets its stage. Water at or below 0 degC stalls development.

use larvae_core::{Column, ColumnSet, PropagatorError};
use larvae_propagator::context::StepContext;
use larvae_propagator::propagator::{Propagator, WriteMode};

use crate::rate_law::{RateLaw, TemperatureMode};

/// Advances development level and stage.
///
/// In reverse time the level runs down towards zero (clamped there) while
/// the stage keeps the highest value it reached.
#[derive(Clone, Debug)]
pub struct DevelopmentPropagator {
    law: RateLaw,
    temperature: TemperatureMode,
}

impl DevelopmentPropagator {
    /// Create a development stage driven by `law` at the temperatures
    /// selected by `temperature`.
    pub fn new(law: RateLaw, temperature: TemperatureMode) -> Self {
        Self { law, temperature }
    }

    /// The rate law in use.
    pub fn law(&self) -> &RateLaw {
        &self.law
    }
}

impl Propagator for DevelopmentPropagator {
    fn name(&self) -> &str {
        "development"
    }

    fn reads(&self) -> ColumnSet {
        [Column::Temperature, Column::DevLevel, Column::DevStage].into()
    }

    fn writes(&self) -> Vec<(Column, WriteMode)> {
        vec![
            (Column::DevLevel, WriteMode::Incremental),
            (Column::DevStage, WriteMode::Incremental),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let dt = ctx.dt();
        if dt == 0.0 {
            return Ok(());
        }
        let cols = ctx.columns();
        for i in 0..cols.len() {
            if !cols.is_active(i) {
                continue;
            }
            let t = self.temperature.resolve(cols.temperature[i]);
            let rate = self.law.development_rate(cols.dev_stage[i], t);
            if rate > 0.0 {
                cols.dev_level[i] = (cols.dev_level[i] + dt * rate).max(0.0);
            }
            cols.dev_stage[i] = cols.dev_stage[i].ratchet(cols.dev_level[i]);
        }
        Ok(())
    }
}
