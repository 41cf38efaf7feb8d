//! Horizontally uniform environment for scenario runs.

use larvae_core::Environment;
use serde::{Deserialize, Serialize};

/// A flat-bottomed ocean with one temperature everywhere.
///
/// Optionally the temperature falls off linearly with depth, which is
/// enough to exercise the temperature-dependent laws without a real
/// ocean-model reader.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UniformOcean {
    /// Temperature at the surface, in degrees Celsius.
    pub temperature: f64,
    /// Temperature change per metre of depth (positive cools downward).
    pub lapse_per_metre: f64,
    /// Seafloor depth in metres, positive down.
    pub seafloor_depth: f64,
}

impl Default for UniformOcean {
    fn default() -> Self {
        Self {
            temperature: 8.0,
            lapse_per_metre: 0.0,
            seafloor_depth: 100.0,
        }
    }
}

impl UniformOcean {
    /// Constant temperature over a flat seafloor.
    pub fn new(temperature: f64, seafloor_depth: f64) -> Self {
        Self {
            temperature,
            lapse_per_metre: 0.0,
            seafloor_depth,
        }
    }
}

impl Environment for UniformOcean {
    fn sea_water_temperature(&self, _lon: f64, _lat: f64, z: f64) -> Option<f64> {
        // Below the seafloor there is no water to sample.
        if z < -self.seafloor_depth {
            return None;
        }
        Some(self.temperature + self.lapse_per_metre * z)
    }

    fn sea_floor_depth(&self, _lon: f64, _lat: f64) -> Option<f64> {
        Some(self.seafloor_depth)
    }
}
