//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] is the serde-facing description of a run: timestep, rate
//! law, swim law, milestone ages, seafloor policy and environment
//! fallbacks. A partial TOML file overrides only the keys it names.
//!
//! [`EngineConfig`] is the builder-input for [`TickEngine`](crate::TickEngine):
//! an already-assembled propagator pipeline plus the environment it samples.

use std::fs;
use std::path::{Path, PathBuf};

use larvae_core::{EnvFallbacks, Environment};
use larvae_propagator::{validate_pipeline, PipelineError, PipelinePlan, Propagator};
use larvae_propagators::{
    check_finite, MilestoneAges, Milestones, ParameterError, RateLaw, SeafloorPolicy, SwimLaw,
    TemperatureMode, DEFAULT_LETHAL_COLD,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating a configuration.
///
/// All of these are fatal before the first step runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Propagator pipeline validation failed.
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),
    /// A model parameter is unusable.
    #[error("parameter: {0}")]
    Parameter(#[from] ParameterError),
    /// The TOML document could not be parsed.
    #[error("parse: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// `dt_seconds` is NaN or infinite.
    #[error("dt_seconds must be finite, got {value}")]
    InvalidDt {
        /// The invalid value.
        value: f64,
    },
    /// An environment fallback value is unusable.
    #[error("invalid fallback: {reason}")]
    InvalidFallback {
        /// Description of the problem.
        reason: String,
    },
}

// ── Sections ───────────────────────────────────────────────────────

/// `[development]`: where the development clock takes its temperature from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevelopmentConfig {
    /// Use each particle's ambient temperature. When `false`,
    /// `fixed_temperature` is used for the whole ensemble.
    pub temperature_dependent: bool,
    /// Temperature used when not temperature-dependent, in degrees Celsius.
    pub fixed_temperature: f64,
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            temperature_dependent: true,
            fixed_temperature: 8.0,
        }
    }
}

/// `[swimming]`: swim-speed law and its temperature source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwimmingConfig {
    /// Use each particle's ambient temperature for the swim speed.
    pub temperature_dependent: bool,
    /// Temperature used when not temperature-dependent, in degrees Celsius.
    pub fixed_temperature: f64,
    /// Swim speed at 0 degC, in m/s.
    pub k1: f64,
    /// Temperature exponent of the swim speed, per degree Celsius.
    pub k2: f64,
}

impl Default for SwimmingConfig {
    fn default() -> Self {
        let law = SwimLaw::default();
        Self {
            temperature_dependent: true,
            fixed_temperature: 8.0,
            k1: law.k1,
            k2: law.k2,
        }
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Complete, run-scoped model configuration.
///
/// Built once (from defaults, code, or TOML), validated, and then turned
/// into propagators by [`standard_pipeline`](crate::standard_pipeline).
/// Nothing in it changes while the run is in progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Signed timestep in seconds. Negative runs time backwards; zero
    /// makes every step a no-op.
    pub dt_seconds: f64,
    /// What to do with particles that end a step below the seafloor.
    pub seafloor_policy: SeafloorPolicy,
    /// Pre-ciliated larvae die in water at or below this temperature.
    pub lethal_cold_temperature: f64,
    /// Development clock temperature source.
    pub development: DevelopmentConfig,
    /// Swim law and its temperature source.
    pub swimming: SwimmingConfig,
    /// Development rate law.
    pub rate_law: RateLaw,
    /// Ages the run's milestone levels are derived from.
    pub milestones: MilestoneAges,
    /// Substitutes for missing environment data.
    pub fallbacks: EnvFallbacks,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt_seconds: 3600.0,
            development: DevelopmentConfig::default(),
            swimming: SwimmingConfig::default(),
            rate_law: RateLaw::default(),
            milestones: MilestoneAges::default(),
            seafloor_policy: SeafloorPolicy::default(),
            lethal_cold_temperature: DEFAULT_LETHAL_COLD,
            fallbacks: EnvFallbacks::default(),
        }
    }
}

impl RunConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Check every parameter and that the milestone levels can be derived.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt_seconds.is_finite() {
            return Err(ConfigError::InvalidDt {
                value: self.dt_seconds,
            });
        }
        check_finite("development.fixed_temperature", self.development.fixed_temperature)?;
        check_finite("swimming.fixed_temperature", self.swimming.fixed_temperature)?;
        check_finite("lethal_cold_temperature", self.lethal_cold_temperature)?;
        self.rate_law.validate()?;
        self.swim_law().validate()?;
        self.milestones()?;

        if !self.fallbacks.temperature.is_finite() {
            return Err(ConfigError::InvalidFallback {
                reason: format!("temperature must be finite, got {}", self.fallbacks.temperature),
            });
        }
        let depth = self.fallbacks.seafloor_depth;
        if !depth.is_finite() || depth <= 0.0 {
            return Err(ConfigError::InvalidFallback {
                reason: format!("seafloor_depth must be finite and positive, got {depth}"),
            });
        }
        Ok(())
    }

    /// Milestone levels for this run's rate law.
    pub fn milestones(&self) -> Result<Milestones, ConfigError> {
        Ok(Milestones::derive(&self.rate_law, &self.milestones)?)
    }

    /// Temperature source of the development clock.
    pub fn development_temperature(&self) -> TemperatureMode {
        TemperatureMode::from_toggle(
            self.development.temperature_dependent,
            self.development.fixed_temperature,
        )
    }

    /// Temperature source of the swim law.
    pub fn swimming_temperature(&self) -> TemperatureMode {
        TemperatureMode::from_toggle(
            self.swimming.temperature_dependent,
            self.swimming.fixed_temperature,
        )
    }

    /// The configured swim law.
    pub fn swim_law(&self) -> SwimLaw {
        SwimLaw {
            k1: self.swimming.k1,
            k2: self.swimming.k2,
        }
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Everything a [`TickEngine`](crate::TickEngine) needs besides the
/// ensemble itself.
pub struct EngineConfig {
    /// Signed timestep in seconds.
    pub dt: f64,
    /// Substitutes for missing environment data.
    pub fallbacks: EnvFallbacks,
    /// Propagators, in execution order.
    pub propagators: Vec<Box<dyn Propagator>>,
    /// Environment sampler.
    pub environment: Box<dyn Environment>,
}

impl EngineConfig {
    /// Assemble the standard pipeline for `run` around a host transport.
    pub fn from_run(
        run: &RunConfig,
        transport: Box<dyn larvae_core::Transport>,
        environment: Box<dyn Environment>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            dt: run.dt_seconds,
            fallbacks: run.fallbacks,
            propagators: crate::pipeline::standard_pipeline(run, transport)?,
            environment,
        })
    }

    /// Validate the pipeline and return its plan.
    pub fn validate(&self) -> Result<PipelinePlan, ConfigError> {
        Ok(validate_pipeline(&self.propagators, self.dt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larvae_propagator::WriteMode;
    use larvae_core::{Column, ColumnSet, PropagatorError};
    use larvae_propagator::StepContext;
    use larvae_test_utils::{MockEnvironment, StillWater};

    #[test]
    fn defaults_validate() {
        let config = RunConfig::default();
        config.validate().unwrap();
        let m = config.milestones().unwrap();
        assert!((m.wsmax - 1.06).abs() < 1e-3, "wsmax = {}", m.wsmax);
        assert!((m.tmax - 2.2).abs() < 1e-3, "tmax = {}", m.tmax);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config = RunConfig::from_toml(
            r#"
            dt_seconds = -1800.0
            seafloor_policy = "revert"

            [development]
            temperature_dependent = false
            "#,
        )
        .unwrap();
        assert_eq!(config.dt_seconds, -1800.0);
        assert_eq!(config.seafloor_policy, SeafloorPolicy::Revert);
        assert_eq!(config.development_temperature(), TemperatureMode::Fixed(8.0));
        assert_eq!(config.swimming_temperature(), TemperatureMode::Ambient);
        assert_eq!(config.rate_law, RateLaw::log_quadratic());
    }

    #[test]
    fn simple_exponential_form_parses() {
        let config = RunConfig::from_toml(
            r#"
            [rate_law]
            form = "simple_exponential"
            stage0 = { a_hours = 250.0, b = -0.1509 }
            stage1 = { a_hours = 2071.0, b = -0.1637 }
            first_milestone = { coefficient_hours = 713.08, exponent = -1.149 }
            competence_span = { coefficient_hours = 4560.17, exponent = -1.081 }
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_law, RateLaw::simple_exponential());
    }

    #[test]
    fn rendered_config_reloads() {
        let config = RunConfig {
            seafloor_policy: SeafloorPolicy::Deactivate,
            ..RunConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RunConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = RunConfig::from_toml(r#"seafloor_policy = "bounce""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_rate_law_form_is_rejected() {
        let err = RunConfig::from_toml(
            r#"
            [rate_law]
            form = "arrhenius"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RunConfig::from_toml("time_step = 60.0").is_err());
    }

    #[test]
    fn non_positive_coefficient_is_a_parameter_error() {
        let mut config = RunConfig::default();
        config.rate_law = RateLaw::LogQuadratic {
            stage0: larvae_propagators::LogQuadraticCoefficients {
                a_hours: -1.0,
                b: 0.05,
                c: 1.0,
            },
            stage1: larvae_propagators::LogQuadraticCoefficients {
                a_hours: 18767.6,
                b: 0.04,
                c: 1.2,
            },
        };
        assert!(matches!(config.validate(), Err(ConfigError::Parameter(_))));
    }

    #[test]
    fn non_finite_dt_is_rejected() {
        let config = RunConfig {
            dt_seconds: f64::NAN,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDt { .. })));
    }

    #[test]
    fn non_finite_temperature_names_the_parameter() {
        let mut config = RunConfig::default();
        config.swimming.fixed_temperature = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Parameter(ParameterError::NonFinite { ref parameter, .. })
                if parameter == "swimming.fixed_temperature"
        ));
    }

    #[test]
    fn bad_fallback_depth_is_rejected() {
        let mut config = RunConfig::default();
        config.fallbacks.seafloor_depth = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFallback { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::load("/nonexistent/larvae.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/larvae.toml"));
    }

    #[test]
    fn engine_config_from_run_validates() {
        let config = EngineConfig::from_run(
            &RunConfig::default(),
            Box::new(StillWater),
            Box::new(MockEnvironment::new()),
        )
        .unwrap();
        let plan = config.validate().unwrap();
        assert_eq!(
            plan.names(),
            ["development", "terminal_velocity", "still_water", "seafloor", "lifecycle"]
        );
    }

    struct Noop;

    impl Propagator for Noop {
        fn name(&self) -> &str {
            "noop"
        }
        fn reads(&self) -> ColumnSet {
            ColumnSet::empty()
        }
        fn writes(&self) -> Vec<(Column, WriteMode)> {
            vec![]
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            Ok(())
        }
    }

    #[test]
    fn engine_config_rejects_empty_pipeline() {
        let config = EngineConfig {
            dt: 1.0,
            fallbacks: EnvFallbacks::default(),
            propagators: vec![],
            environment: Box::new(MockEnvironment::new()),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Pipeline(PipelineError::EmptyPipeline))
        ));

        let ok = EngineConfig {
            propagators: vec![Box::new(Noop)],
            ..config
        };
        assert!(ok.validate().is_ok());
    }
}
