//! Temperature-dependent development and swimming laws.
//!
//! Pure functions only. [`RateLaw`] maps (stage, temperature) to a
//! development rate in levels per second; [`SwimLaw`] maps (level,
//! temperature) to a vertical swim velocity in m/s. Both are selected and
//! parameterized once per run.

use larvae_core::{DevStage, TimeDirection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::milestones::Milestones;

/// Seconds in an hour. Calibration constants are quoted in hours.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// A model parameter that cannot produce a usable run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParameterError {
    /// Parameter is NaN or infinite.
    #[error("{parameter} must be finite, got {value}")]
    NonFinite {
        /// Dotted parameter path.
        parameter: String,
        /// Offending value.
        value: f64,
    },
    /// Parameter must be strictly positive.
    #[error("{parameter} must be positive, got {value}")]
    NonPositive {
        /// Dotted parameter path.
        parameter: String,
        /// Offending value.
        value: f64,
    },
    /// Parameter must not be negative.
    #[error("{parameter} must not be negative, got {value}")]
    Negative {
        /// Dotted parameter path.
        parameter: String,
        /// Offending value.
        value: f64,
    },
    /// The competence span at the reference temperature is not positive,
    /// so milestone levels cannot be derived.
    #[error("competence span at {reference_temperature} degC is {span_hours} h; must be positive")]
    NonPositiveSpan {
        /// Temperature the span was evaluated at.
        reference_temperature: f64,
        /// The computed span.
        span_hours: f64,
    },
}

/// Reject a non-finite configuration value, naming the parameter.
pub fn check_finite(parameter: &str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NonFinite {
            parameter: parameter.to_string(),
            value,
        })
    }
}

pub(crate) fn check_positive(parameter: &str, value: f64) -> Result<(), ParameterError> {
    check_finite(parameter, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositive {
            parameter: parameter.to_string(),
            value,
        })
    }
}

// ── Coefficient sets ───────────────────────────────────────────────

/// `duration = a * exp(b * T)` hours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExponentialCoefficients {
    /// Scale, in hours.
    pub a_hours: f64,
    /// Temperature exponent, per degree Celsius.
    pub b: f64,
}

impl ExponentialCoefficients {
    /// Stage duration in seconds at temperature `t`.
    pub fn duration(&self, t: f64) -> f64 {
        self.a_hours * SECONDS_PER_HOUR * (self.b * t).exp()
    }

    fn validate(&self, prefix: &str) -> Result<(), ParameterError> {
        check_positive(&format!("{prefix}.a_hours"), self.a_hours)?;
        check_finite(&format!("{prefix}.b"), self.b)
    }
}

/// `duration = a * exp(b * ln(T)^2) / T^c` hours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogQuadraticCoefficients {
    /// Scale, in hours.
    pub a_hours: f64,
    /// Curvature of the log-duration in `ln(T)`.
    pub b: f64,
    /// Power-law exponent on temperature.
    pub c: f64,
}

impl LogQuadraticCoefficients {
    /// Cumulative duration in seconds to reach this milestone at `t > 0`.
    pub fn duration(&self, t: f64) -> f64 {
        let ln_t = t.ln();
        self.a_hours * SECONDS_PER_HOUR * (self.b * ln_t * ln_t).exp() / t.powf(self.c)
    }

    fn validate(&self, prefix: &str) -> Result<(), ParameterError> {
        check_positive(&format!("{prefix}.a_hours"), self.a_hours)?;
        check_finite(&format!("{prefix}.b"), self.b)?;
        check_finite(&format!("{prefix}.c"), self.c)
    }
}

/// `age = coefficient * T^exponent` hours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    /// Scale, in hours.
    pub coefficient_hours: f64,
    /// Temperature exponent.
    pub exponent: f64,
}

impl PowerLaw {
    /// Age in seconds at temperature `t`.
    pub fn age(&self, t: f64) -> f64 {
        self.coefficient_hours * SECONDS_PER_HOUR * t.powf(self.exponent)
    }

    fn validate(&self, prefix: &str) -> Result<(), ParameterError> {
        check_positive(&format!("{prefix}.coefficient_hours"), self.coefficient_hours)?;
        check_finite(&format!("{prefix}.exponent"), self.exponent)
    }
}

// ── Rate law ───────────────────────────────────────────────────────

/// Milestone timing at one temperature, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MilestoneTiming {
    /// Age at the first milestone (level 1).
    pub first_milestone: f64,
    /// Time from the first milestone to competence (level 2).
    pub competence_span: f64,
}

/// Development rate law, selected by the `form` key in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum RateLaw {
    /// `rate = 1 / (a * exp(b*T))`, stage 1 coefficients used as-is.
    SimpleExponential {
        /// Embryo stage coefficients.
        stage0: ExponentialCoefficients,
        /// Coefficients for every stage from ciliated onwards.
        stage1: ExponentialCoefficients,
        /// Age at the first milestone.
        first_milestone: PowerLaw,
        /// Time from first milestone to competence.
        competence_span: PowerLaw,
    },
    /// `rate = 1 / D(T)` with `D(T) = a * exp(b * ln(T)^2) / T^c`.
    ///
    /// The stage 1 closed form gives the cumulative time to competence,
    /// so from stage 1 on the marginal rate `1 / (D1 - D0)` is used.
    LogQuadratic {
        /// Time to the first milestone.
        stage0: LogQuadraticCoefficients,
        /// Time to competence.
        stage1: LogQuadraticCoefficients,
    },
}

impl Default for RateLaw {
    fn default() -> Self {
        Self::log_quadratic()
    }
}

impl RateLaw {
    /// Calibration with separate exponential fits per stage.
    pub fn simple_exponential() -> Self {
        RateLaw::SimpleExponential {
            stage0: ExponentialCoefficients {
                a_hours: 250.0,
                b: -0.1509,
            },
            stage1: ExponentialCoefficients {
                a_hours: 2071.0,
                b: -0.1637,
            },
            first_milestone: PowerLaw {
                coefficient_hours: 713.08,
                exponent: -1.149,
            },
            competence_span: PowerLaw {
                coefficient_hours: 4560.17,
                exponent: -1.081,
            },
        }
    }

    /// Log-quadratic calibration: 240 h to the first milestone and 1840 h
    /// to competence at 8 degC.
    pub fn log_quadratic() -> Self {
        RateLaw::LogQuadratic {
            stage0: LogQuadraticCoefficients {
                a_hours: 1546.7,
                b: 0.05,
                c: 1.0,
            },
            stage1: LogQuadraticCoefficients {
                a_hours: 18767.6,
                b: 0.04,
                c: 1.2,
            },
        }
    }

    /// Configuration name of this form.
    pub fn form(&self) -> &'static str {
        match self {
            RateLaw::SimpleExponential { .. } => "simple_exponential",
            RateLaw::LogQuadratic { .. } => "log_quadratic",
        }
    }

    /// Development rate in levels per second.
    ///
    /// Exactly zero for `t <= 0` or non-finite `t`: development stalls in
    /// cold water, and the closed forms are never evaluated there.
    pub fn development_rate(&self, stage: DevStage, t: f64) -> f64 {
        if !t.is_finite() || t <= 0.0 {
            return 0.0;
        }
        let duration = match (self, stage) {
            (RateLaw::SimpleExponential { stage0, .. }, DevStage::Embryo) => stage0.duration(t),
            (RateLaw::SimpleExponential { stage1, .. }, _) => stage1.duration(t),
            (RateLaw::LogQuadratic { stage0, .. }, DevStage::Embryo) => stage0.duration(t),
            (RateLaw::LogQuadratic { stage0, stage1 }, _) => {
                stage1.duration(t) - stage0.duration(t)
            }
        };
        if duration.is_finite() && duration > 0.0 {
            1.0 / duration
        } else {
            0.0
        }
    }

    /// Age at the first milestone and the competence span at `t`.
    pub fn milestone_timing(&self, t: f64) -> MilestoneTiming {
        match self {
            RateLaw::SimpleExponential {
                first_milestone,
                competence_span,
                ..
            } => MilestoneTiming {
                first_milestone: first_milestone.age(t),
                competence_span: competence_span.age(t),
            },
            RateLaw::LogQuadratic { stage0, stage1 } => {
                let d0 = stage0.duration(t);
                MilestoneTiming {
                    first_milestone: d0,
                    competence_span: stage1.duration(t) - d0,
                }
            }
        }
    }

    /// Check every coefficient is usable.
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            RateLaw::SimpleExponential {
                stage0,
                stage1,
                first_milestone,
                competence_span,
            } => {
                stage0.validate("rate_law.stage0")?;
                stage1.validate("rate_law.stage1")?;
                first_milestone.validate("rate_law.first_milestone")?;
                competence_span.validate("rate_law.competence_span")
            }
            RateLaw::LogQuadratic { stage0, stage1 } => {
                stage0.validate("rate_law.stage0")?;
                stage1.validate("rate_law.stage1")
            }
        }
    }
}

// ── Temperature mode ───────────────────────────────────────────────

/// Where a law takes its temperature from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TemperatureMode {
    /// The particle's sampled ambient temperature.
    Ambient,
    /// One fixed temperature for the whole ensemble.
    Fixed(f64),
}

impl TemperatureMode {
    /// Build from a configuration toggle and its fallback temperature.
    pub fn from_toggle(temperature_dependent: bool, fixed: f64) -> Self {
        if temperature_dependent {
            TemperatureMode::Ambient
        } else {
            TemperatureMode::Fixed(fixed)
        }
    }

    /// Temperature to use for a particle with the given ambient value.
    pub fn resolve(self, ambient: f64) -> f64 {
        match self {
            TemperatureMode::Ambient => ambient,
            TemperatureMode::Fixed(t) => t,
        }
    }
}

// ── Swim law ───────────────────────────────────────────────────────

/// Saturation swim speed `k1 * exp(k2 * T)` m/s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwimLaw {
    /// Speed at 0 degC, in m/s.
    pub k1: f64,
    /// Temperature exponent, per degree Celsius.
    pub k2: f64,
}

impl Default for SwimLaw {
    fn default() -> Self {
        Self {
            k1: 1.547e-4,
            k2: 0.08893,
        }
    }
}

impl SwimLaw {
    /// Saturation swim magnitude at temperature `t`, in m/s.
    pub fn saturation(&self, t: f64) -> f64 {
        self.k1 * (self.k2 * t).exp()
    }

    /// Vertical swim velocity (positive upward) for a larva at level
    /// `devlev` in water of temperature `t`.
    ///
    /// Zero before the first milestone, ramping to saturation by
    /// `milestones.wsmax`, constant until competence, then the same speed
    /// downward. The result is multiplied by the time direction, so it is
    /// zero for a zero-length step and flipped in reverse time.
    pub fn swim_velocity_scale(
        &self,
        devlev: f64,
        t: f64,
        milestones: &Milestones,
        direction: TimeDirection,
    ) -> f64 {
        if devlev < 1.0 {
            return 0.0;
        }
        let saturation = self.saturation(t);
        let magnitude = if devlev < milestones.wsmax {
            saturation * (devlev - 1.0) / (milestones.wsmax - 1.0)
        } else if devlev < 2.0 {
            saturation
        } else {
            -saturation
        };
        magnitude * direction.sign()
    }

    /// Check both coefficients are usable.
    pub fn validate(&self) -> Result<(), ParameterError> {
        check_finite("swimming.k1", self.k1)?;
        if self.k1 < 0.0 {
            return Err(ParameterError::Negative {
                parameter: "swimming.k1".into(),
                value: self.k1,
            });
        }
        check_finite("swimming.k2", self.k2)
    }
}
