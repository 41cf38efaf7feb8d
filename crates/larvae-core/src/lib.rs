//! Core types and traits for the larvae development and settlement engine.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! particle ensemble (structure of arrays), column identifiers used to
//! declare propagator dependencies, outcome and error types, and the
//! traits through which the host simulation supplies environment data
//! and transport.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod column;
pub mod ensemble;
pub mod error;
pub mod id;
pub mod outcome;
pub mod stage;
pub mod traits;

pub use column::{Column, ColumnSet};
pub use ensemble::{ColumnsMut, Ensemble, Particle, ParticleSeed, TransportView};
pub use error::{PropagatorError, StepError};
pub use id::{ParticleId, StepId};
pub use outcome::{Deactivation, Outcome, Status};
pub use stage::{DevStage, TimeDirection};
pub use traits::{EnvFallbacks, Environment, Sample, Transport};
