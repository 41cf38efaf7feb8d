//! Adapter running the host transport as a pipeline stage, plus a
//! constant-current reference transport.

use larvae_core::{Column, ColumnSet, PropagatorError, Transport, TransportView};
use larvae_propagator::context::StepContext;
use larvae_propagator::propagator::{Propagator, WriteMode};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Pipeline stage wrapping a host [`Transport`].
///
/// Records the start-of-step horizontal position of every active
/// particle, then hands a [`TransportView`] to the host integrator. A host
/// that moves an inactive particle fails the step.
pub struct TransportStage {
    inner: Box<dyn Transport>,
}

impl TransportStage {
    /// Wrap a host transport.
    pub fn new(inner: Box<dyn Transport>) -> Self {
        Self { inner }
    }
}

impl Propagator for TransportStage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn reads(&self) -> ColumnSet {
        [Column::TerminalVelocity].into()
    }

    fn reads_previous(&self) -> ColumnSet {
        [Column::Lon, Column::Lat, Column::Z].into()
    }

    fn writes(&self) -> Vec<(Column, WriteMode)> {
        vec![
            (Column::PrevLon, WriteMode::Full),
            (Column::PrevLat, WriteMode::Full),
            (Column::Lon, WriteMode::Incremental),
            (Column::Lat, WriteMode::Incremental),
            (Column::Z, WriteMode::Incremental),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let dt = ctx.dt();
        let cols = ctx.columns();
        for i in 0..cols.len() {
            if cols.is_active(i) {
                cols.prev_lon[i] = cols.lon[i];
                cols.prev_lat[i] = cols.lat[i];
            }
        }
        if dt == 0.0 || !cols.any_active() {
            return Ok(());
        }

        let frozen: Vec<(usize, [u64; 3])> = (0..cols.len())
            .filter(|&i| !cols.is_active(i))
            .map(|i| (i, position_bits(cols.lon[i], cols.lat[i], cols.z[i])))
            .collect();
        self.inner.transport(&mut cols.transport_view(), dt)?;

        let moved = frozen
            .iter()
            .find(|&&(i, bits)| position_bits(cols.lon[i], cols.lat[i], cols.z[i]) != bits);
        if let Some(&(i, _)) = moved {
            return Err(PropagatorError::ConstraintViolation {
                constraint: format!(
                    "transport '{}' moved inactive particle {}",
                    self.inner.name(),
                    cols.ids[i]
                ),
            });
        }
        Ok(())
    }
}

fn position_bits(lon: f64, lat: f64, z: f64) -> [u64; 3] {
    [lon.to_bits(), lat.to_bits(), z.to_bits()]
}

/// Constant horizontal current plus the larvae's own vertical swimming.
///
/// `terminal_velocity` is already signed for the direction of time, so
/// the vertical displacement uses `|dt|`. Particles cannot rise above the
/// sea surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformCurrent {
    /// Eastward velocity in m/s.
    pub u: f64,
    /// Northward velocity in m/s.
    pub v: f64,
}

impl UniformCurrent {
    /// A current of `u` m/s east and `v` m/s north.
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

impl Transport for UniformCurrent {
    fn name(&self) -> &str {
        "uniform_current"
    }

    fn transport(&self, cols: &mut TransportView<'_>, dt: f64) -> Result<(), PropagatorError> {
        let dlat = (self.v * dt / EARTH_RADIUS_M).to_degrees();
        for i in 0..cols.len() {
            if !cols.is_active(i) {
                continue;
            }
            let coslat = cols.lat[i].to_radians().cos();
            if coslat.abs() > f64::EPSILON {
                cols.lon[i] += (self.u * dt / (EARTH_RADIUS_M * coslat)).to_degrees();
            }
            cols.lat[i] += dlat;
            cols.z[i] = (cols.z[i] + cols.terminal_velocity[i] * dt.abs()).min(0.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_stage, set};
    use larvae_core::{Ensemble, Outcome, ParticleSeed};
    use larvae_test_utils::{FailingTransport, MockEnvironment};

    #[test]
    fn records_previous_position_then_moves() {
        let stage = TransportStage::new(Box::new(UniformCurrent::new(0.0, 1.0)));
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(2.0, 60.0, -50.0));
        run_stage(&stage, &mut e, &MockEnvironment::uniform(8.0, 100.0), 3600.0).unwrap();

        assert_eq!(e.read(Column::PrevLat).unwrap()[0], 60.0);
        assert_eq!(e.read(Column::PrevLon).unwrap()[0], 2.0);
        let lat = e.read(Column::Lat).unwrap()[0];
        let expected = 60.0 + (3600.0 / EARTH_RADIUS_M).to_degrees();
        assert!((lat - expected).abs() < 1e-12);
        assert_eq!(e.read(Column::Lon).unwrap()[0], 2.0);
    }

    #[test]
    fn swimming_moves_vertically_and_stops_at_surface() {
        let stage = TransportStage::new(Box::new(UniformCurrent::default()));
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(0.0, 0.0, -10.0));
        e.seed(ParticleSeed::spawned(0.0, 0.0, -0.5));
        set(&mut e, |cols| {
            cols.terminal_velocity[0] = -1e-3;
            cols.terminal_velocity[1] = 1e-3;
        });
        run_stage(&stage, &mut e, &MockEnvironment::uniform(8.0, 100.0), -1000.0).unwrap();
        let z = e.read(Column::Z).unwrap();
        assert!((z[0] - (-11.0)).abs() < 1e-12);
        assert_eq!(z[1], 0.0);
    }

    #[test]
    fn inactive_rows_do_not_move() {
        let stage = TransportStage::new(Box::new(UniformCurrent::new(0.5, 0.5)));
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(1.0, 1.0, -10.0));
        e.seed(ParticleSeed::spawned(1.0, 1.0, -10.0));
        set(&mut e, |cols| {
            cols.deactivate(1, Outcome::SeafloorContact);
        });
        run_stage(&stage, &mut e, &MockEnvironment::uniform(8.0, 100.0), 3600.0).unwrap();
        let p = e.particle(1).unwrap();
        assert_eq!((p.lon, p.lat, p.z), (1.0, 1.0, -10.0));
        assert_ne!(e.particle(0).unwrap().lon, 1.0);
    }

    /// Shifts every row east, ignoring status.
    struct CarelessDrift;

    impl Transport for CarelessDrift {
        fn name(&self) -> &str {
            "careless_drift"
        }

        fn transport(&self, cols: &mut TransportView<'_>, _dt: f64) -> Result<(), PropagatorError> {
            for lon in cols.lon.iter_mut() {
                *lon += 0.1;
            }
            Ok(())
        }
    }

    #[test]
    fn moving_an_inactive_row_fails_the_stage() {
        let stage = TransportStage::new(Box::new(CarelessDrift));
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(1.0, 1.0, -10.0));
        e.seed(ParticleSeed::spawned(1.0, 1.0, -10.0));
        set(&mut e, |cols| {
            cols.deactivate(1, Outcome::Settled);
        });
        let env = MockEnvironment::uniform(8.0, 100.0);
        let err = run_stage(&stage, &mut e, &env, 60.0).unwrap_err();
        match err {
            PropagatorError::ConstraintViolation { constraint } => {
                assert_eq!(constraint, "transport 'careless_drift' moved inactive particle 1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_dt_skips_host_transport() {
        let stage = TransportStage::new(Box::new(FailingTransport::always()));
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(0.0, 0.0, -10.0));
        assert!(run_stage(&stage, &mut e, &MockEnvironment::uniform(8.0, 100.0), 0.0).is_ok());
    }

    #[test]
    fn host_errors_propagate() {
        let stage = TransportStage::new(Box::new(FailingTransport::always()));
        assert_eq!(stage.name(), "failing_transport");
        let mut e = Ensemble::new();
        e.seed(ParticleSeed::spawned(0.0, 0.0, -10.0));
        let env = MockEnvironment::uniform(8.0, 100.0);
        let err = run_stage(&stage, &mut e, &env, 60.0).unwrap_err();
        assert!(matches!(err, PropagatorError::ExecutionFailed { .. }));
    }
}
