//! Assembly of the standard per-step pipeline.

use larvae_core::Transport;
use larvae_propagator::Propagator;
use larvae_propagators::{
    DevelopmentPropagator, LifecyclePropagator, SeafloorPropagator, TerminalVelocityPropagator,
    TransportStage,
};

use crate::config::{ConfigError, RunConfig};

/// Build the canonical stage order for `run`:
/// development, terminal velocity, host transport, seafloor, lifecycle.
///
/// Validates `run` and derives its milestone levels first. The returned
/// pipeline still has to pass
/// [`validate_pipeline`](larvae_propagator::validate_pipeline), which the
/// engine does on construction.
pub fn standard_pipeline(
    run: &RunConfig,
    transport: Box<dyn Transport>,
) -> Result<Vec<Box<dyn Propagator>>, ConfigError> {
    run.validate()?;
    let milestones = run.milestones()?;
    tracing::info!(
        form = run.rate_law.form(),
        wsmax = milestones.wsmax,
        tmax = milestones.tmax,
        seafloor_policy = %run.seafloor_policy,
        transport = transport.name(),
        "derived milestone levels"
    );

    Ok(vec![
        Box::new(DevelopmentPropagator::new(
            run.rate_law.clone(),
            run.development_temperature(),
        )),
        Box::new(TerminalVelocityPropagator::new(
            run.swim_law(),
            milestones,
            run.swimming_temperature(),
        )),
        Box::new(TransportStage::new(transport)),
        Box::new(SeafloorPropagator::new(run.seafloor_policy)),
        Box::new(LifecyclePropagator::new(
            milestones,
            run.lethal_cold_temperature,
        )),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use larvae_propagator::{validate_pipeline, PipelineError};
    use larvae_test_utils::StillWater;

    #[test]
    fn standard_order_passes_validation() {
        let stages = standard_pipeline(&RunConfig::default(), Box::new(StillWater)).unwrap();
        let plan = validate_pipeline(&stages, 3600.0).unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.last_writer(larvae_core::Column::Status), Some(4));
    }

    #[test]
    fn reordered_stages_are_rejected() {
        let mut stages = standard_pipeline(&RunConfig::default(), Box::new(StillWater)).unwrap();
        // Swim velocity computed before development has advanced.
        stages.swap(0, 1);
        let err = validate_pipeline(&stages, 3600.0).unwrap_err();
        assert!(matches!(err, PipelineError::OrderViolation { .. }));
    }

    #[test]
    fn invalid_run_is_rejected_before_assembly() {
        let mut run = RunConfig::default();
        run.milestones.max_age_days = 0.0;
        assert!(matches!(
            standard_pipeline(&run, Box::new(StillWater)),
            Err(ConfigError::Parameter(_))
        ));
    }
}
