//! Rate laws and the per-step propagators of the larval development and
//! settlement model.
//!
//! # Pipeline order (each step)
//!
//! 1. [`DevelopmentPropagator`]: reads(temperature, dev_level, dev_stage)
//!    → writes(dev_level, dev_stage)
//! 2. [`TerminalVelocityPropagator`]: reads(dev_level, temperature)
//!    → writes(terminal_velocity)
//! 3. [`TransportStage`]: reads(terminal_velocity), reads_previous(lon,
//!    lat, z) → writes(prev_lon, prev_lat, lon, lat, z)
//! 4. [`SeafloorPropagator`]: reads(position, dev_level, eligibility)
//!    → writes(position, seafloor_depth, eligibility, status)
//! 5. [`LifecyclePropagator`]: reads(dev_level, z, seafloor_depth,
//!    eligibility, temperature) → writes(status)
//!
//! Temperature is sampled by the engine before stage 1.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod development;
pub mod lifecycle;
pub mod milestones;
pub mod rate_law;
pub mod seafloor;
pub mod terminal_velocity;
pub mod transport;

#[cfg(test)]
mod testing;

pub use development::DevelopmentPropagator;
pub use lifecycle::{LifecyclePropagator, DEFAULT_LETHAL_COLD};
pub use milestones::{MilestoneAges, Milestones};
pub use rate_law::{
    check_finite, ExponentialCoefficients, LogQuadraticCoefficients, MilestoneTiming,
    ParameterError, PowerLaw, RateLaw, SwimLaw, TemperatureMode,
};
pub use seafloor::{SeafloorPolicy, SeafloorPropagator, UnknownPolicy};
pub use terminal_velocity::TerminalVelocityPropagator;
pub use transport::{TransportStage, UniformCurrent, EARTH_RADIUS_M};
