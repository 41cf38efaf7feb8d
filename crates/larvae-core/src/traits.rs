//! Host-facing collaborator traits: environment data and transport.
//!
//! The engine never reads ocean-model files or integrates currents itself.
//! The host supplies both through these traits.

use serde::{Deserialize, Serialize};

use crate::ensemble::TransportView;
use crate::error::PropagatorError;

/// Point sampler for environment fields.
///
/// Returning `None` (or a non-finite value) means "no data here", e.g. a
/// land cell or a reader with no coverage. The engine substitutes the
/// configured [`EnvFallbacks`] value.
pub trait Environment: Send + 'static {
    /// Sea-water temperature in degrees Celsius at a point.
    fn sea_water_temperature(&self, lon: f64, lat: f64, z: f64) -> Option<f64>;

    /// Depth of the seafloor below sea level, in metres (positive down).
    fn sea_floor_depth(&self, lon: f64, lat: f64) -> Option<f64>;
}

/// Host advection and mixing integrator.
///
/// Called once per step, after the development and swim-velocity stages.
/// Implementations move active particles horizontally and vertically,
/// adding each particle's `terminal_velocity` to the vertical motion.
/// Inactive rows must be left untouched; the stage running the transport
/// fails the step if one moves.
pub trait Transport: Send + 'static {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Advance particle positions by `dt` seconds (negative in reverse time).
    fn transport(&self, view: &mut TransportView<'_>, dt: f64) -> Result<(), PropagatorError>;
}

/// Values substituted for missing environment data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvFallbacks {
    /// Fallback sea-water temperature in degrees Celsius.
    pub temperature: f64,
    /// Fallback seafloor depth in metres. Also used where the sampled depth
    /// is zero or negative (land, or an elevation-signed reader).
    pub seafloor_depth: f64,
}

impl Default for EnvFallbacks {
    fn default() -> Self {
        Self {
            temperature: 10.0,
            seafloor_depth: 100.0,
        }
    }
}

/// A sampled environment value, with whether it came from the fallback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// The value to use.
    pub value: f64,
    /// `true` when the environment had no usable data.
    pub fallback: bool,
}

impl EnvFallbacks {
    /// Resolve a raw temperature sample.
    pub fn temperature(&self, sampled: Option<f64>) -> Sample {
        resolve(sampled.filter(|v| v.is_finite()), self.temperature)
    }

    /// Resolve a raw seafloor depth sample.
    pub fn seafloor_depth(&self, sampled: Option<f64>) -> Sample {
        resolve(
            sampled.filter(|v| v.is_finite() && *v > 0.0),
            self.seafloor_depth,
        )
    }
}

fn resolve(sampled: Option<f64>, fallback: f64) -> Sample {
    match sampled {
        Some(value) => Sample {
            value,
            fallback: false,
        },
        None => Sample {
            value: fallback,
            fallback: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let fb = EnvFallbacks::default();
        assert_eq!(fb.temperature, 10.0);
        assert_eq!(fb.seafloor_depth, 100.0);
    }

    #[test]
    fn missing_and_non_finite_use_fallback() {
        let fb = EnvFallbacks::default();
        assert_eq!(
            fb.temperature(Some(7.5)),
            Sample {
                value: 7.5,
                fallback: false
            }
        );
        assert!(fb.temperature(None).fallback);
        assert_eq!(fb.temperature(Some(f64::NAN)).value, 10.0);
        assert_eq!(fb.seafloor_depth(Some(f64::INFINITY)).value, 100.0);
    }

    #[test]
    fn zero_is_a_real_sample() {
        let fb = EnvFallbacks::default();
        let s = fb.temperature(Some(0.0));
        assert_eq!(s.value, 0.0);
        assert!(!s.fallback);
    }

    #[test]
    fn non_positive_depth_uses_fallback() {
        let fb = EnvFallbacks::default();
        for raw in [0.0, -20.0, -0.0] {
            let s = fb.seafloor_depth(Some(raw));
            assert_eq!(s.value, 100.0);
            assert!(s.fallback);
        }
        assert!(!fb.seafloor_depth(Some(0.5)).fallback);
    }
}
