//! Run-scoped milestone levels derived from age constants.

use serde::{Deserialize, Serialize};

use crate::rate_law::{check_finite, check_positive, ParameterError, RateLaw, SECONDS_PER_HOUR};

const SECONDS_PER_DAY: f64 = 24.0 * SECONDS_PER_HOUR;

/// Age constants the milestone levels are derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneAges {
    /// Temperature the ages are quoted at, in degrees Celsius.
    pub reference_temperature: f64,
    /// Age at which upward swimming saturates, in days.
    pub max_swim_age_days: f64,
    /// Maximum larval age, in days.
    pub max_age_days: f64,
}

impl Default for MilestoneAges {
    fn default() -> Self {
        Self {
            reference_temperature: 8.0,
            max_swim_age_days: 14.0,
            max_age_days: 90.0,
        }
    }
}

/// Development levels at which swimming saturates and larvae die of age.
///
/// Derived once per run and shared by every particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Milestones {
    /// Level at which upward swim speed reaches saturation.
    pub wsmax: f64,
    /// Level at which a larva dies of old age.
    pub tmax: f64,
}

impl Milestones {
    /// Map the age constants onto the development clock.
    ///
    /// With `t1` the age at the first milestone and `span` the time from
    /// there to competence (both at the reference temperature), an age
    /// `a` corresponds to level `1 + (a - t1) / span`.
    pub fn derive(law: &RateLaw, ages: &MilestoneAges) -> Result<Self, ParameterError> {
        check_positive("milestones.reference_temperature", ages.reference_temperature)?;
        check_positive("milestones.max_swim_age_days", ages.max_swim_age_days)?;
        check_positive("milestones.max_age_days", ages.max_age_days)?;

        let timing = law.milestone_timing(ages.reference_temperature);
        if !timing.competence_span.is_finite() || timing.competence_span <= 0.0 {
            return Err(ParameterError::NonPositiveSpan {
                reference_temperature: ages.reference_temperature,
                span_hours: timing.competence_span / SECONDS_PER_HOUR,
            });
        }
        check_finite("milestones.first_milestone", timing.first_milestone)?;

        let level = |age_days: f64| {
            1.0 + (age_days * SECONDS_PER_DAY - timing.first_milestone) / timing.competence_span
        };
        let milestones = Milestones {
            wsmax: level(ages.max_swim_age_days),
            tmax: level(ages.max_age_days),
        };
        check_finite("milestones.wsmax", milestones.wsmax)?;
        check_finite("milestones.tmax", milestones.tmax)?;
        Ok(milestones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_law::LogQuadraticCoefficients;

    #[test]
    fn log_quadratic_defaults() {
        let m = Milestones::derive(&RateLaw::log_quadratic(), &MilestoneAges::default()).unwrap();
        assert!((m.wsmax - 1.06).abs() < 1e-3, "wsmax = {}", m.wsmax);
        assert!((m.tmax - 2.2).abs() < 1e-3, "tmax = {}", m.tmax);
    }

    #[test]
    fn simple_exponential_defaults() {
        let m =
            Milestones::derive(&RateLaw::simple_exponential(), &MilestoneAges::default()).unwrap();
        assert!((m.wsmax - 1.562).abs() < 1e-3, "wsmax = {}", m.wsmax);
        assert!((m.tmax - 5.349).abs() < 1e-3, "tmax = {}", m.tmax);
    }

    #[test]
    fn non_positive_span_is_rejected() {
        let law = RateLaw::LogQuadratic {
            stage0: LogQuadraticCoefficients {
                a_hours: 500.0,
                b: 0.0,
                c: 0.0,
            },
            stage1: LogQuadraticCoefficients {
                a_hours: 500.0,
                b: 0.0,
                c: 0.0,
            },
        };
        let err = Milestones::derive(&law, &MilestoneAges::default()).unwrap_err();
        assert!(matches!(err, ParameterError::NonPositiveSpan { .. }));
    }

    #[test]
    fn non_positive_ages_are_rejected() {
        let ages = MilestoneAges {
            reference_temperature: 0.0,
            ..MilestoneAges::default()
        };
        assert!(Milestones::derive(&RateLaw::default(), &ages).is_err());
    }
}
