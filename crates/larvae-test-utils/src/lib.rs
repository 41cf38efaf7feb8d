//! Test utilities and mock collaborators for larvae development.
//!
//! Provides a configurable [`MockEnvironment`], host transports with known
//! behavior (still water, scripted failures, NaN injection) and ensemble
//! builders for constructing test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    random_ensemble, spawned_ensemble, FailingTransport, NanTransport, StillWater,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use larvae_core::Environment;

type TemperatureField = Box<dyn Fn(f64, f64, f64) -> Option<f64> + Send + Sync>;
type DepthField = Box<dyn Fn(f64, f64) -> Option<f64> + Send + Sync>;

/// Mock implementation of [`Environment`].
///
/// With nothing configured every lookup returns `None`, so the engine's
/// fallbacks apply. Set uniform values with
/// [`with_temperature`](MockEnvironment::with_temperature) and
/// [`with_seafloor_depth`](MockEnvironment::with_seafloor_depth), or
/// arbitrary fields with the `*_field` variants. Lookups are counted.
pub struct MockEnvironment {
    temperature: Option<TemperatureField>,
    seafloor_depth: Option<DepthField>,
    temperature_queries: AtomicUsize,
    seafloor_queries: AtomicUsize,
}

impl MockEnvironment {
    /// An environment with no data at all.
    pub fn new() -> Self {
        Self {
            temperature: None,
            seafloor_depth: None,
            temperature_queries: AtomicUsize::new(0),
            seafloor_queries: AtomicUsize::new(0),
        }
    }

    /// Uniform temperature and seafloor depth everywhere.
    pub fn uniform(temperature: f64, seafloor_depth: f64) -> Self {
        Self::new()
            .with_temperature(temperature)
            .with_seafloor_depth(seafloor_depth)
    }

    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with_temperature_field(move |_, _, _| Some(temperature))
    }

    pub fn with_seafloor_depth(self, depth: f64) -> Self {
        self.with_seafloor_field(move |_, _| Some(depth))
    }

    /// Temperature as a function of `(lon, lat, z)`.
    pub fn with_temperature_field<F>(mut self, f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> Option<f64> + Send + Sync + 'static,
    {
        self.temperature = Some(Box::new(f));
        self
    }

    /// Seafloor depth as a function of `(lon, lat)`.
    pub fn with_seafloor_field<F>(mut self, f: F) -> Self
    where
        F: Fn(f64, f64) -> Option<f64> + Send + Sync + 'static,
    {
        self.seafloor_depth = Some(Box::new(f));
        self
    }

    /// Number of temperature lookups so far.
    pub fn temperature_queries(&self) -> usize {
        self.temperature_queries.load(Ordering::Relaxed)
    }

    /// Number of seafloor depth lookups so far.
    pub fn seafloor_queries(&self) -> usize {
        self.seafloor_queries.load(Ordering::Relaxed)
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MockEnvironment {
    fn sea_water_temperature(&self, lon: f64, lat: f64, z: f64) -> Option<f64> {
        self.temperature_queries.fetch_add(1, Ordering::Relaxed);
        self.temperature.as_ref().and_then(|f| f(lon, lat, z))
    }

    fn sea_floor_depth(&self, lon: f64, lat: f64) -> Option<f64> {
        self.seafloor_queries.fetch_add(1, Ordering::Relaxed);
        self.seafloor_depth.as_ref().and_then(|f| f(lon, lat))
    }
}
