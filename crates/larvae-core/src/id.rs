//! Strongly-typed identifiers.

use std::fmt;

/// Stable identity of a larva particle.
///
/// Assigned sequentially at seeding time and never reused within an
/// [`Ensemble`](crate::Ensemble), even after the particle is deactivated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing step counter.
///
/// Incremented each time the simulation advances one timestep, including
/// no-op steps (zero dt or an empty ensemble).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_id_next_increments() {
        assert_eq!(StepId(0).next(), StepId(1));
        assert_eq!(StepId(41).next().to_string(), "42");
    }

    #[test]
    fn particle_id_ordering_follows_value() {
        assert!(ParticleId(3) < ParticleId(10));
        assert_eq!(ParticleId::from(7), ParticleId(7));
    }
}
