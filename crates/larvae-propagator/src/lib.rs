//! Propagator trait, step context and pipeline validation for larvae
//! simulations.
//!
//! The `Propagator` trait defines the `&self` step function over a
//! [`StepContext`] that owns split-borrowed ensemble columns for the
//! duration of one step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod propagator;

pub use context::{FallbackCounts, StepContext};
pub use pipeline::{validate_pipeline, PipelineError, PipelinePlan};
pub use propagator::{Propagator, WriteMode};
