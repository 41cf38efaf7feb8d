//! Benchmark profiles for the larvae development and settlement engine.
//!
//! - [`reference_profile`]: 10K larvae over a shelf-depth uniform ocean
//! - [`stress_profile`]: 100K larvae, same pipeline
//! - [`profile_simulation`]: a ready-to-step [`Simulation`] for a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use larvae_core::Ensemble;
use larvae_engine::{ConfigError, RunConfig, Simulation, UniformOcean};
use larvae_propagators::UniformCurrent;
use larvae_test_utils::random_ensemble;

/// A benchmark profile: run configuration plus seeded ensemble.
pub struct Profile {
    /// Run configuration (hourly forward steps, lift policy).
    pub run: RunConfig,
    /// The seeded larvae.
    pub ensemble: Ensemble,
    /// Environment for the run.
    pub ocean: UniformOcean,
}

/// 10K larvae with mixed ages and depths.
///
/// The ocean is 9 degC at the surface, cooling 0.01 degC per metre, over
/// a 150 m seafloor, so every pipeline stage has work to do.
pub fn reference_profile(seed: u64) -> Profile {
    profile(10_000, seed)
}

/// Same as [`reference_profile`] at 10x the particle count.
pub fn stress_profile(seed: u64) -> Profile {
    profile(100_000, seed)
}

fn profile(particles: usize, seed: u64) -> Profile {
    Profile {
        run: RunConfig::default(),
        ensemble: random_ensemble(particles, seed),
        ocean: UniformOcean {
            temperature: 9.0,
            lapse_per_metre: 0.01,
            seafloor_depth: 150.0,
        },
    }
}

/// Build a simulation for `profile` with a gentle eastward current.
pub fn profile_simulation(profile: Profile) -> Result<Simulation, ConfigError> {
    Simulation::new(
        profile.run,
        profile.ensemble,
        Box::new(UniformCurrent::new(0.1, 0.02)),
        Box::new(profile.ocean),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_steps() {
        let mut sim = profile_simulation(reference_profile(42)).unwrap();
        let report = sim.step().unwrap();
        assert_eq!(report.metrics.active_before, 10_000);
        assert_eq!(report.metrics.propagator_us.len(), 5);
    }
}
