//! Step engine, run configuration and telemetry for larval development
//! and settlement runs.
//!
//! Provides [`TickEngine`] (the core step loop with rollback),
//! [`Simulation`] (the owned user-facing handle), [`RunConfig`] (the
//! TOML-loadable run configuration) and [`standard_pipeline`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod environment;
pub mod metrics;
pub mod pipeline;
pub mod simulation;
pub mod telemetry;
pub mod tick;

pub use config::{ConfigError, DevelopmentConfig, EngineConfig, RunConfig, SwimmingConfig};
pub use environment::UniformOcean;
pub use metrics::{OutcomeTally, StepMetrics};
pub use pipeline::standard_pipeline;
pub use simulation::Simulation;
pub use telemetry::init_logging;
pub use tick::{StepReport, TickEngine};
