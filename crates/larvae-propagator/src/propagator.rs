//! The [`Propagator`] trait and [`WriteMode`] enum.
//!
//! Propagators are the ordered stages of the per-step pipeline. They
//! declare the columns they touch at registration, which lets the engine
//! reject stage orders that would observe stale values before the first
//! step runs.

use crate::context::StepContext;
use larvae_core::{Column, ColumnSet, PropagatorError};

/// How a propagator writes a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Every active row is recomputed from scratch each step.
    ///
    /// A full write must be the first write of its column in the
    /// pipeline, since it discards whatever an earlier stage left there.
    Full,

    /// Rows are updated in place, only where the stage has something to
    /// change (e.g. clamping depth for particles below the seafloor).
    Incremental,
}

/// One stage of the per-step pipeline.
///
/// # Contract
///
/// - `step()` MUST be deterministic: same inputs produce identical outputs.
/// - `&self`: propagators hold only run-scoped parameters; per-particle
///   state lives in the ensemble columns.
/// - `reads()` and `writes()` are called once at startup, not per step.
/// - Inactive rows are never modified.
///
/// # Object safety
///
/// This trait is object-safe; the engine stores propagators as
/// `Vec<Box<dyn Propagator>>`.
///
/// # Examples
///
/// A minimal propagator that pins every active particle's swim velocity:
///
/// ```
/// use larvae_propagator::{Propagator, StepContext, WriteMode};
/// use larvae_core::{Column, ColumnSet, PropagatorError};
///
/// struct Sinker {
///     speed: f64,
/// }
///
/// impl Propagator for Sinker {
///     fn name(&self) -> &str { "sinker" }
///
///     fn reads(&self) -> ColumnSet { ColumnSet::empty() }
///
///     fn writes(&self) -> Vec<(Column, WriteMode)> {
///         vec![(Column::TerminalVelocity, WriteMode::Full)]
///     }
///
///     fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
///         let cols = ctx.columns();
///         for i in 0..cols.len() {
///             if cols.is_active(i) {
///                 cols.terminal_velocity[i] = -self.speed;
///             }
///         }
///         Ok(())
///     }
/// }
///
/// let prop = Sinker { speed: 1e-3 };
/// assert_eq!(prop.name(), "sinker");
/// ```
pub trait Propagator: Send + 'static {
    /// Human-readable name for error reporting and telemetry.
    fn name(&self) -> &str;

    /// Columns this propagator reads and expects to be final for the step.
    ///
    /// No later stage may write a column listed here. A stage may write
    /// a column it reads itself.
    fn reads(&self) -> ColumnSet;

    /// Columns this propagator reads as they were before a later stage
    /// may adjust them.
    ///
    /// Exempt from the ordering check. The transport stage uses this for
    /// positions, which the seafloor stage corrects afterwards.
    ///
    /// Default: empty set.
    fn reads_previous(&self) -> ColumnSet {
        ColumnSet::empty()
    }

    /// Columns this propagator writes, with their write mode.
    ///
    /// Called once at pipeline construction, not per step.
    fn writes(&self) -> Vec<(Column, WriteMode)>;

    /// Largest timestep magnitude, in seconds, this stage handles.
    ///
    /// The pipeline validates `|dt| <= min(max_dt)` across all stages.
    /// Return `None` to impose no constraint.
    fn max_dt(&self) -> Option<f64> {
        None
    }

    /// Execute the propagator for one step.
    ///
    /// Called once per step in pipeline order. The [`StepContext`]
    /// provides the ensemble columns, environment sampling, the signed
    /// timestep and the step id.
    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError>;
}
