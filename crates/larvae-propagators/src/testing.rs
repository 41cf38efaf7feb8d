//! Helpers for running a single propagator against an ensemble in tests.

use larvae_core::{
    ColumnsMut, Deactivation, EnvFallbacks, Ensemble, Environment, PropagatorError, StepId,
};
use larvae_propagator::{Propagator, StepContext};

/// Sample ambient temperature, then run `prop` once.
pub(crate) fn run_stage(
    prop: &dyn Propagator,
    ensemble: &mut Ensemble,
    env: &dyn Environment,
    dt: f64,
) -> Result<Vec<Deactivation>, PropagatorError> {
    let mut log = Vec::new();
    {
        let columns = ensemble.columns_mut(&mut log);
        let mut ctx = StepContext::new(columns, env, EnvFallbacks::default(), StepId(0), dt);
        ctx.sample_ambient_temperature();
        prop.step(&mut ctx)?;
    }
    Ok(log)
}

/// Mutate columns directly to set up a scenario.
pub(crate) fn set(ensemble: &mut Ensemble, f: impl FnOnce(&mut ColumnsMut<'_>)) {
    let mut log = Vec::new();
    let mut columns = ensemble.columns_mut(&mut log);
    f(&mut columns);
}
