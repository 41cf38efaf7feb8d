//! Terminal outcomes and particle status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ParticleId;

/// Why a particle left the simulation.
///
/// Outcomes are irreversible: once a particle carries one it is never
/// mutated again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Reverse-time run reached the spawning event (level back to zero).
    Spawned,
    /// Competent larva on the seafloor.
    Settled,
    /// Development level passed the maximum-age level.
    DiedOldAge,
    /// Pre-ciliated larva in water at or below the lethal temperature.
    DiedCold,
    /// Removed by the `deactivate` seafloor contact policy.
    SeafloorContact,
}

impl Outcome {
    /// Every outcome, in lifecycle-gate priority order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Spawned,
        Outcome::Settled,
        Outcome::DiedOldAge,
        Outcome::DiedCold,
        Outcome::SeafloorContact,
    ];

    /// Detailed reason recorded with the deactivation.
    pub fn reason(self) -> &'static str {
        match self {
            Outcome::Spawned => "spawned",
            Outcome::Settled => "settled",
            Outcome::DiedOldAge => "died (old age)",
            Outcome::DiedCold => "died (cold)",
            Outcome::SeafloorContact => "contacted seafloor",
        }
    }

    /// Coarse status category, as used for plotting and summaries.
    pub fn status_label(self) -> &'static str {
        match self {
            Outcome::Spawned => "spawned",
            Outcome::Settled => "settled",
            Outcome::DiedOldAge | Outcome::DiedCold => "died",
            Outcome::SeafloorContact => "seafloor",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Lifecycle status of one particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Still tracked and updated every step.
    #[default]
    Active,
    /// Left the simulation; the row is frozen.
    Inactive(Outcome),
}

impl Status {
    /// Whether the particle is still updated.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }

    /// The outcome, if the particle has left the simulation.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Status::Active => None,
            Status::Inactive(outcome) => Some(outcome),
        }
    }
}

/// A deactivation request emitted during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deactivation {
    /// The deactivated particle.
    pub id: ParticleId,
    /// Why it was deactivated.
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_match_labels() {
        assert_eq!(Outcome::DiedOldAge.reason(), "died (old age)");
        assert_eq!(Outcome::DiedCold.reason(), "died (cold)");
        assert_eq!(Outcome::DiedOldAge.status_label(), "died");
        assert_eq!(Outcome::SeafloorContact.to_string(), "contacted seafloor");
    }

    #[test]
    fn status_outcome_round_trip() {
        assert!(Status::default().is_active());
        assert_eq!(Status::Active.outcome(), None);
        let s = Status::Inactive(Outcome::Settled);
        assert!(!s.is_active());
        assert_eq!(s.outcome(), Some(Outcome::Settled));
    }
}
