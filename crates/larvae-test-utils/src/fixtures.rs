//! Reusable host transports and ensemble builders.
//!
//! - [`StillWater`]: no current; only the larvae's own swimming moves them.
//! - [`FailingTransport`]: fails deterministically (always, or N times).
//! - [`NanTransport`]: corrupts the first active depth with NaN.

use std::sync::atomic::{AtomicUsize, Ordering};

use larvae_core::{Ensemble, ParticleSeed, PropagatorError, Transport, TransportView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// No horizontal motion; `z += terminal_velocity * |dt|`, capped at the
/// surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct StillWater;

impl Transport for StillWater {
    fn name(&self) -> &str {
        "still_water"
    }

    fn transport(&self, cols: &mut TransportView<'_>, dt: f64) -> Result<(), PropagatorError> {
        for i in 0..cols.len() {
            if cols.is_active(i) {
                cols.z[i] = (cols.z[i] + cols.terminal_velocity[i] * dt.abs()).min(0.0);
            }
        }
        Ok(())
    }
}

/// A transport that fails a fixed number of times, then behaves like
/// [`StillWater`].
pub struct FailingTransport {
    remaining: Option<AtomicUsize>,
    calls: AtomicUsize,
}

impl FailingTransport {
    /// Fail on every call.
    pub fn always() -> Self {
        Self {
            remaining: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail on the first `n` calls, then succeed.
    pub fn times(n: usize) -> Self {
        Self {
            remaining: Some(AtomicUsize::new(n)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Transport for FailingTransport {
    fn name(&self) -> &str {
        "failing_transport"
    }

    fn transport(&self, cols: &mut TransportView<'_>, dt: f64) -> Result<(), PropagatorError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let fail = match &self.remaining {
            None => true,
            Some(left) => left
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .is_ok(),
        };
        if fail {
            // Leave a visible mark so rollback can be checked.
            for i in 0..cols.len() {
                if cols.is_active(i) {
                    cols.lon[i] += 1.0;
                }
            }
            return Err(PropagatorError::ExecutionFailed {
                reason: format!("scripted failure on call {call}"),
            });
        }
        StillWater.transport(cols, dt)
    }
}

/// Writes NaN into the depth of the first active particle.
#[derive(Clone, Copy, Debug, Default)]
pub struct NanTransport;

impl Transport for NanTransport {
    fn name(&self) -> &str {
        "nan_transport"
    }

    fn transport(&self, cols: &mut TransportView<'_>, _dt: f64) -> Result<(), PropagatorError> {
        if let Some(i) = (0..cols.len()).find(|&i| cols.is_active(i)) {
            cols.z[i] = f64::NAN;
        }
        Ok(())
    }
}

/// `n` freshly spawned larvae at one point.
pub fn spawned_ensemble(n: usize, lon: f64, lat: f64, z: f64) -> Ensemble {
    let mut ensemble = Ensemble::new();
    for _ in 0..n {
        ensemble.seed(ParticleSeed::spawned(lon, lat, z));
    }
    ensemble
}

/// `n` larvae scattered over a 1-degree box with depths in `[-200, 0)`
/// and levels in `[0, 3)`, reproducible from `seed`.
pub fn random_ensemble(n: usize, seed: u64) -> Ensemble {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ensemble = Ensemble::new();
    for _ in 0..n {
        ensemble.seed(ParticleSeed {
            lon: rng.gen_range(0.0..1.0),
            lat: rng.gen_range(59.0..60.0),
            z: rng.gen_range(-200.0..0.0),
            dev_level: rng.gen_range(0.0..3.0),
        });
    }
    ensemble
}
