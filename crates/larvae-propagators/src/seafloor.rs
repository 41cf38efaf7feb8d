//! Seafloor contact detection, contact policy and settlement eligibility.

use std::fmt;
use std::str::FromStr;

use larvae_core::{Column, ColumnSet, Outcome, PropagatorError};
use larvae_propagator::context::StepContext;
use larvae_propagator::propagator::{Propagator, WriteMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens to a particle that ends a step below the seafloor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeafloorPolicy {
    /// Put it back on the seafloor and keep it active.
    #[default]
    Lift,
    /// Put it on the seafloor and remove it with
    /// [`Outcome::SeafloorContact`].
    Deactivate,
    /// Undo the step's horizontal move; depth is left as is.
    Revert,
}

impl SeafloorPolicy {
    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            SeafloorPolicy::Lift => "lift",
            SeafloorPolicy::Deactivate => "deactivate",
            SeafloorPolicy::Revert => "revert",
        }
    }
}

impl fmt::Display for SeafloorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised seafloor policy name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown seafloor policy '{0}' (expected lift, deactivate or revert)")]
pub struct UnknownPolicy(pub String);

impl FromStr for SeafloorPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lift" => Ok(SeafloorPolicy::Lift),
            "deactivate" => Ok(SeafloorPolicy::Deactivate),
            "revert" => Ok(SeafloorPolicy::Revert),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Samples the seafloor under every active particle after transport and
/// applies the contact policy.
///
/// A competent larva (level 2 or more) touching the seafloor becomes
/// settlement-eligible; the flag is latched and never cleared. Running
/// the stage twice on unchanged input changes nothing the second time.
#[derive(Clone, Debug)]
pub struct SeafloorPropagator {
    policy: SeafloorPolicy,
}

impl SeafloorPropagator {
    /// Create the stage with a contact policy.
    pub fn new(policy: SeafloorPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> SeafloorPolicy {
        self.policy
    }
}

impl Propagator for SeafloorPropagator {
    fn name(&self) -> &str {
        "seafloor"
    }

    fn reads(&self) -> ColumnSet {
        [
            Column::Lon,
            Column::Lat,
            Column::Z,
            Column::PrevLon,
            Column::PrevLat,
            Column::DevLevel,
            Column::SettlementEligible,
        ]
        .into()
    }

    fn writes(&self) -> Vec<(Column, WriteMode)> {
        vec![
            (Column::Lon, WriteMode::Incremental),
            (Column::Lat, WriteMode::Incremental),
            (Column::Z, WriteMode::Incremental),
            (Column::SeafloorDepth, WriteMode::Incremental),
            (Column::SettlementEligible, WriteMode::Incremental),
            (Column::Status, WriteMode::Incremental),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let n = ctx.columns_ref().len();
        let mut contacts = Vec::new();
        for i in 0..n {
            if !ctx.columns_ref().is_active(i) {
                continue;
            }
            let (lon, lat) = (ctx.columns_ref().lon[i], ctx.columns_ref().lat[i]);
            let depth = ctx.sample_seafloor_depth(lon, lat);
            let cols = ctx.columns();
            cols.seafloor_depth[i] = depth;
            if cols.z[i] < -depth {
                contacts.push(i);
            }
        }
        if contacts.is_empty() {
            return Ok(());
        }

        let mut removed = 0usize;
        for &i in &contacts {
            let cols = ctx.columns();
            if cols.dev_level[i] >= 2.0 {
                cols.settlement_eligible[i] = true;
            }
            match self.policy {
                SeafloorPolicy::Lift => {
                    cols.z[i] = -cols.seafloor_depth[i];
                }
                SeafloorPolicy::Deactivate => {
                    cols.z[i] = -cols.seafloor_depth[i];
                    if cols.deactivate(i, Outcome::SeafloorContact) {
                        removed += 1;
                    }
                }
                SeafloorPolicy::Revert => {
                    cols.lon[i] = cols.prev_lon[i];
                    cols.lat[i] = cols.prev_lat[i];
                    let (lon, lat) = (cols.lon[i], cols.lat[i]);
                    let depth = ctx.sample_seafloor_depth(lon, lat);
                    ctx.columns().seafloor_depth[i] = depth;
                }
            }
        }
        tracing::trace!(
            step = %ctx.step_id(),
            policy = %self.policy,
            contacts = contacts.len(),
            removed,
            "seafloor contacts"
        );
        Ok(())
    }
}
