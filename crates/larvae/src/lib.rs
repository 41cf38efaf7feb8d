//! Larvae: temperature-driven larval development, vertical swimming and
//! seafloor settlement for particle-tracking ocean models.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all larvae sub-crates. For most hosts, adding `larvae` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use larvae::prelude::*;
//!
//! // Fifty freshly spawned larvae at 40 m depth.
//! let mut ensemble = Ensemble::new();
//! for k in 0..50 {
//!     ensemble.seed(ParticleSeed::spawned(4.0 + 0.001 * k as f64, 60.0, -40.0));
//! }
//!
//! let run = RunConfig::default();
//! let mut sim = Simulation::new(
//!     run,
//!     ensemble,
//!     Box::new(UniformCurrent::new(0.1, 0.0)),
//!     Box::new(UniformOcean::new(9.0, 120.0)),
//! )
//! .unwrap();
//!
//! // One day of hourly steps.
//! let reports = sim.run_for(24).unwrap();
//! assert_eq!(reports.last().unwrap().step_id, StepId(24));
//! assert_eq!(sim.ensemble().active_count(), 50);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `larvae-core` | Ensemble, columns, outcomes, host traits |
//! | [`propagator`] | `larvae-propagator` | Propagator trait and pipeline validation |
//! | [`propagators`] | `larvae-propagators` | Rate laws and the standard stages |
//! | [`engine`] | `larvae-engine` | Step engine, run configuration, telemetry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`larvae-core`).
///
/// Contains the [`types::Ensemble`], outcome and status types, error
/// types, and the host traits [`types::Environment`] and
/// [`types::Transport`].
pub use larvae_core as types;

/// Propagator trait and pipeline validation (`larvae-propagator`).
///
/// The [`propagator::Propagator`] trait is the extension point for
/// additional per-step stages.
pub use larvae_propagator as propagator;

/// Rate laws and the standard stages (`larvae-propagators`).
///
/// Includes [`propagators::RateLaw`], [`propagators::SwimLaw`] and the
/// reference transport [`propagators::UniformCurrent`].
pub use larvae_propagators as propagators;

/// Step engine and configuration (`larvae-engine`).
///
/// [`engine::Simulation`] for running, [`engine::RunConfig`] for TOML
/// configuration.
pub use larvae_engine as engine;

/// Common imports for typical use.
///
/// ```rust
/// use larvae::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use larvae_core::{
        Column, DevStage, Ensemble, Environment, Outcome, Particle, ParticleId, ParticleSeed,
        Status, StepId, Transport, TransportView,
    };

    // Errors
    pub use larvae_core::{PropagatorError, StepError};

    // Propagator
    pub use larvae_propagator::{Propagator, StepContext, WriteMode};

    // Laws and reference transport
    pub use larvae_propagators::{RateLaw, SeafloorPolicy, SwimLaw, UniformCurrent};

    // Engine
    pub use larvae_engine::{
        ConfigError, OutcomeTally, RunConfig, Simulation, StepMetrics, StepReport, UniformOcean,
    };
}
