//! Development stages and simulation time direction.

use std::fmt;

/// Discrete development stage, the ratcheted discretization of the
/// continuous development level against the milestones 1 and 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DevStage {
    /// Level below 1: no cilia yet, no swimming.
    #[default]
    Embryo = 0,
    /// Level in `[1, 2)`: ciliated, swims upward.
    Ciliated = 1,
    /// Level at or above 2: competent to settle, swims downward.
    Competent = 2,
}

impl DevStage {
    /// The stage a given development level maps to, ignoring history.
    pub fn from_level(level: f64) -> Self {
        if level >= 2.0 {
            DevStage::Competent
        } else if level >= 1.0 {
            DevStage::Ciliated
        } else {
            DevStage::Embryo
        }
    }

    /// Promote to the stage implied by `level`, never demoting.
    pub fn ratchet(self, level: f64) -> Self {
        self.max(Self::from_level(level))
    }

    /// Ordinal value (0, 1 or 2).
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DevStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Direction of simulated time, from the sign of the signed timestep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeDirection {
    /// Positive dt.
    Forward,
    /// Negative dt (backtracking towards spawning sites).
    Backward,
    /// Zero (or non-finite) dt: the step is a no-op.
    Stationary,
}

impl TimeDirection {
    /// Classify a signed timestep in seconds.
    pub fn of(dt: f64) -> Self {
        if dt > 0.0 {
            TimeDirection::Forward
        } else if dt < 0.0 {
            TimeDirection::Backward
        } else {
            TimeDirection::Stationary
        }
    }

    /// `sign(dt)` as -1, 0 or +1. Unlike `f64::signum`, zero maps to zero.
    pub fn sign(self) -> f64 {
        match self {
            TimeDirection::Forward => 1.0,
            TimeDirection::Backward => -1.0,
            TimeDirection::Stationary => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_level_thresholds() {
        assert_eq!(DevStage::from_level(0.0), DevStage::Embryo);
        assert_eq!(DevStage::from_level(0.999), DevStage::Embryo);
        assert_eq!(DevStage::from_level(1.0), DevStage::Ciliated);
        assert_eq!(DevStage::from_level(1.99), DevStage::Ciliated);
        assert_eq!(DevStage::from_level(2.0), DevStage::Competent);
        assert_eq!(DevStage::from_level(7.5), DevStage::Competent);
    }

    #[test]
    fn ratchet_never_demotes() {
        assert_eq!(DevStage::Competent.ratchet(0.5), DevStage::Competent);
        assert_eq!(DevStage::Ciliated.ratchet(0.0), DevStage::Ciliated);
        assert_eq!(DevStage::Embryo.ratchet(2.1), DevStage::Competent);
    }

    #[test]
    fn time_direction_sign() {
        assert_eq!(TimeDirection::of(3600.0).sign(), 1.0);
        assert_eq!(TimeDirection::of(-3600.0).sign(), -1.0);
        assert_eq!(TimeDirection::of(0.0).sign(), 0.0);
        assert_eq!(TimeDirection::of(-0.0), TimeDirection::Stationary);
        assert_eq!(TimeDirection::of(f64::NAN), TimeDirection::Stationary);
    }
}
