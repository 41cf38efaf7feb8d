//! Error types for step execution.
//!
//! Configuration errors live with the configuration (`larvae-engine`);
//! pipeline structure errors live with the validator (`larvae-propagator`).
//! This module covers what can go wrong while a step is running.

use thiserror::Error;

use crate::column::Column;
use crate::id::ParticleId;

/// Errors from the step engine during `execute_step()`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    /// A propagator returned an error. The ensemble was restored to its
    /// state at the start of the step.
    #[error("propagator '{name}' failed: {reason}")]
    PropagatorFailed {
        /// Name of the failing propagator.
        name: String,
        /// The underlying propagator error.
        #[source]
        reason: PropagatorError,
    },
    /// Stepping is disabled after too many consecutive failed steps.
    #[error("stepping disabled after {failures} consecutive failed steps")]
    StepDisabled {
        /// Number of consecutive failures that triggered the disable.
        failures: u32,
    },
}

/// Errors from individual propagator execution.
///
/// Returned by `Propagator::step()` and wrapped in
/// [`StepError::PropagatorFailed`] by the step engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PropagatorError {
    /// The propagator (or the host collaborator it wraps) failed.
    #[error("execution failed: {reason}")]
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite value appeared in a column the propagator writes.
    #[error("non-finite value in column {column}{}", particle_suffix(.particle))]
    NanDetected {
        /// The column containing the value.
        column: Column,
        /// The first offending particle, if known.
        particle: Option<ParticleId>,
    },
    /// A model invariant was violated.
    #[error("constraint violation: {constraint}")]
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

fn particle_suffix(particle: &Option<ParticleId>) -> String {
    match particle {
        Some(p) => format!(" for particle {p}"),
        None => String::new(),
    }
}
