//! Vertical swim velocity propagator.

use larvae_core::{Column, ColumnSet, PropagatorError};
use larvae_propagator::context::StepContext;
use larvae_propagator::propagator::{Propagator, WriteMode};

use crate::milestones::Milestones;
use crate::rate_law::{SwimLaw, TemperatureMode};

/// Recomputes every active larva's terminal velocity from its
/// post-development level.
///
/// Must run after [`DevelopmentPropagator`](crate::DevelopmentPropagator)
/// and before transport; the pipeline validator enforces both.
#[derive(Clone, Debug)]
pub struct TerminalVelocityPropagator {
    swim: SwimLaw,
    milestones: Milestones,
    temperature: TemperatureMode,
}

impl TerminalVelocityPropagator {
    /// Create the stage from run-scoped parameters.
    pub fn new(swim: SwimLaw, milestones: Milestones, temperature: TemperatureMode) -> Self {
        Self {
            swim,
            milestones,
            temperature,
        }
    }
}

impl Propagator for TerminalVelocityPropagator {
    fn name(&self) -> &str {
        "terminal_velocity"
    }

    fn reads(&self) -> ColumnSet {
        [Column::DevLevel, Column::Temperature].into()
    }

    fn writes(&self) -> Vec<(Column, WriteMode)> {
        vec![(Column::TerminalVelocity, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let direction = ctx.direction();
        let cols = ctx.columns();
        for i in 0..cols.len() {
            if !cols.is_active(i) {
                continue;
            }
            let t = self.temperature.resolve(cols.temperature[i]);
            cols.terminal_velocity[i] = self.swim.swim_velocity_scale(
                cols.dev_level[i],
                t,
                &self.milestones,
                direction,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_stage, set};
    use larvae_core::{Ensemble, Outcome, ParticleSeed};
    use larvae_test_utils::MockEnvironment;

    fn prop() -> TerminalVelocityPropagator {
        TerminalVelocityPropagator::new(
            SwimLaw::default(),
            Milestones {
                wsmax: 1.06,
                tmax: 2.2,
            },
            TemperatureMode::Ambient,
        )
    }

    fn seeded(levels: &[f64]) -> Ensemble {
        let mut e = Ensemble::new();
        for &dev_level in levels {
            e.seed(ParticleSeed {
                lon: 0.0,
                lat: 0.0,
                z: -20.0,
                dev_level,
            });
        }
        e
    }

    fn velocities(e: &Ensemble) -> Vec<f64> {
        e.read(Column::TerminalVelocity).unwrap().to_vec()
    }

    #[test]
    fn velocity_by_stage() {
        let env = MockEnvironment::uniform(10.0, 100.0);
        let mut e = seeded(&[0.5, 1.5, 2.5]);
        run_stage(&prop(), &mut e, &env, 3600.0).unwrap();
        let sat = SwimLaw::default().saturation(10.0);
        assert_eq!(velocities(&e), vec![0.0, sat, -sat]);
    }

    #[test]
    fn reverse_time_flips_sign_and_zero_dt_stops() {
        let env = MockEnvironment::uniform(10.0, 100.0);
        let sat = SwimLaw::default().saturation(10.0);

        let mut e = seeded(&[0.5, 1.5, 2.5]);
        run_stage(&prop(), &mut e, &env, -3600.0).unwrap();
        assert_eq!(velocities(&e), vec![0.0, -sat, sat]);

        run_stage(&prop(), &mut e, &env, 0.0).unwrap();
        assert_eq!(velocities(&e), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn fixed_swim_temperature() {
        let fixed = TerminalVelocityPropagator::new(
            SwimLaw::default(),
            Milestones {
                wsmax: 1.06,
                tmax: 2.2,
            },
            TemperatureMode::Fixed(8.0),
        );
        let mut e = seeded(&[1.5]);
        run_stage(&fixed, &mut e, &MockEnvironment::uniform(20.0, 100.0), 60.0).unwrap();
        assert_eq!(velocities(&e), vec![SwimLaw::default().saturation(8.0)]);
    }

    #[test]
    fn inactive_rows_keep_last_velocity() {
        let env = MockEnvironment::uniform(10.0, 100.0);
        let mut e = seeded(&[1.5, 1.5]);
        run_stage(&prop(), &mut e, &env, 3600.0).unwrap();
        let before = velocities(&e)[1];
        set(&mut e, |cols| {
            cols.deactivate(1, Outcome::Settled);
        });
        run_stage(&prop(), &mut e, &env, -3600.0).unwrap();
        assert_eq!(velocities(&e)[1], before);
        assert_eq!(velocities(&e)[0], -before);
    }
}
