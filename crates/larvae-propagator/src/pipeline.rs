//! Pipeline validation and write planning.
//!
//! [`validate_pipeline`] runs once at engine startup. It rejects stage
//! orders in which a stage would read a column that a later stage still
//! changes, and builds the [`PipelinePlan`] the engine uses to check each
//! stage's outputs after it runs.

use indexmap::IndexMap;
use larvae_core::{Column, ColumnSet};
use thiserror::Error;

use crate::propagator::{Propagator, WriteMode};

// ── Plan ───────────────────────────────────────────────────────────

/// Precomputed write table for a validated pipeline.
///
/// Built once by [`validate_pipeline`].
#[derive(Debug)]
#[must_use]
pub struct PipelinePlan {
    names: Vec<String>,
    /// `write_modes[propagator_index]` maps `Column → WriteMode`.
    write_modes: Vec<IndexMap<Column, WriteMode>>,
    /// Final writer of every written column.
    last_writer: IndexMap<Column, usize>,
}

impl PipelinePlan {
    /// Number of stages in the plan.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the plan covers zero stages.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Stage names, in execution order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the last stage that writes `column`.
    pub fn last_writer(&self, column: Column) -> Option<usize> {
        self.last_writer.get(&column).copied()
    }

    /// Write mode of `column` for the stage at `propagator_index`.
    pub fn write_mode(&self, propagator_index: usize, column: Column) -> Option<WriteMode> {
        self.write_modes.get(propagator_index)?.get(&column).copied()
    }

    /// Columns written by the stage at `propagator_index`.
    pub fn writes_of(&self, propagator_index: usize) -> ColumnSet {
        match self.write_modes.get(propagator_index) {
            Some(modes) => modes.keys().copied().collect(),
            None => ColumnSet::empty(),
        }
    }

    /// Every column written by some stage.
    pub fn written_columns(&self) -> ColumnSet {
        self.last_writer.keys().copied().collect()
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (startup-time, not per-step).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// No propagators registered.
    #[error("pipeline has no propagators")]
    EmptyPipeline,

    /// A full write would discard another stage's write of the same column.
    #[error("column {column} is fully rewritten by '{second_writer}' after '{first_writer}' wrote it")]
    WriteConflict {
        /// The contested column.
        column: Column,
        /// Name of the earlier writer.
        first_writer: String,
        /// Name of the later writer.
        second_writer: String,
    },

    /// A stage reads a column that a later stage writes.
    #[error("'{reader}' reads {column} before '{writer}' writes it")]
    OrderViolation {
        /// The stage that would see a stale value.
        reader: String,
        /// The later stage that writes the column.
        writer: String,
        /// The column in question.
        column: Column,
    },

    /// The configured dt magnitude exceeds a propagator's `max_dt`.
    #[error("|dt| {configured_dt} exceeds max_dt {max_supported} (constrained by '{constraining_propagator}')")]
    DtTooLarge {
        /// The dt that was requested.
        configured_dt: f64,
        /// The tightest `max_dt` constraint.
        max_supported: f64,
        /// Which propagator constrains it.
        constraining_propagator: String,
    },

    /// The configured dt is NaN or infinite.
    #[error("dt must be finite, got {value}")]
    InvalidDt {
        /// The invalid dt value.
        value: f64,
    },

    /// A propagator's `max_dt()` returned a non-finite or non-positive value.
    #[error("propagator '{propagator}' returned invalid max_dt: {value} (must be finite and positive)")]
    InvalidMaxDt {
        /// Which propagator.
        propagator: String,
        /// The invalid max_dt value.
        value: f64,
    },
}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a propagator pipeline and build the [`PipelinePlan`].
///
/// Checks performed (all at startup, not per-step):
///
/// 1. `dt` is finite. Zero and negative values are valid: zero is a
///    no-op step and negative runs time backwards.
/// 2. Pipeline is non-empty.
/// 3. A [`WriteMode::Full`] write is the first write of its column.
/// 4. No stage `reads()` a column that a later stage writes.
/// 5. `|dt| <= min(max_dt)` across all propagators.
pub fn validate_pipeline(
    propagators: &[Box<dyn Propagator>],
    dt: f64,
) -> Result<PipelinePlan, PipelineError> {
    // 1. dt must be finite
    if !dt.is_finite() {
        return Err(PipelineError::InvalidDt { value: dt });
    }

    // 2. Non-empty
    if propagators.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    // 3. Full writes come first
    {
        let mut first_writer: IndexMap<Column, usize> = IndexMap::new();
        for (i, prop) in propagators.iter().enumerate() {
            for (column, mode) in prop.writes() {
                match first_writer.get(&column) {
                    Some(&j) if j != i && mode == WriteMode::Full => {
                        return Err(PipelineError::WriteConflict {
                            column,
                            first_writer: propagators[j].name().to_string(),
                            second_writer: prop.name().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        first_writer.insert(column, i);
                    }
                }
            }
        }
    }

    // 4. Readers precede every writer of what they read
    for (i, prop) in propagators.iter().enumerate() {
        let reads = prop.reads();
        for later in &propagators[i + 1..] {
            let clash = later.writes().into_iter().find(|(c, _)| reads.contains(*c));
            if let Some((column, _)) = clash {
                return Err(PipelineError::OrderViolation {
                    reader: prop.name().to_string(),
                    writer: later.name().to_string(),
                    column,
                });
            }
        }
    }

    // 5. dt magnitude
    {
        let mut min_max_dt = f64::INFINITY;
        let mut constraining = String::new();
        for prop in propagators {
            if let Some(max) = prop.max_dt() {
                if !max.is_finite() || max <= 0.0 {
                    return Err(PipelineError::InvalidMaxDt {
                        propagator: prop.name().to_string(),
                        value: max,
                    });
                }
                if max < min_max_dt {
                    min_max_dt = max;
                    constraining = prop.name().to_string();
                }
            }
        }
        if dt.abs() > min_max_dt {
            return Err(PipelineError::DtTooLarge {
                configured_dt: dt,
                max_supported: min_max_dt,
                constraining_propagator: constraining,
            });
        }
    }

    // 6. Build plan
    let mut names = Vec::with_capacity(propagators.len());
    let mut write_modes = Vec::with_capacity(propagators.len());
    let mut last_writer: IndexMap<Column, usize> = IndexMap::new();
    for (i, prop) in propagators.iter().enumerate() {
        names.push(prop.name().to_string());
        let mut modes = IndexMap::new();
        for (column, mode) in prop.writes() {
            modes.insert(column, mode);
            last_writer.insert(column, i);
        }
        write_modes.push(modes);
    }

    Ok(PipelinePlan {
        names,
        write_modes,
        last_writer,
    })
}
