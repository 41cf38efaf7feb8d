//! Scenario runner: seed larvae at a site, run them through a uniform
//! ocean and print how they ended up.

use std::f64::consts::TAU;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use larvae_core::{Ensemble, ParticleSeed};
use larvae_engine::{init_logging, RunConfig, Simulation, UniformOcean};
use larvae_propagators::{SeafloorPolicy, UniformCurrent, EARTH_RADIUS_M};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "larvae",
    version,
    about = "Run a larval development and settlement scenario"
)]
struct Cli {
    /// Scenario file with `[run]` and `[scenario]` tables.
    scenario: PathBuf,

    /// Run time backwards from the seeded state.
    #[arg(long)]
    backward: bool,

    /// Override the seafloor contact policy (lift, deactivate, revert).
    #[arg(long)]
    seafloor_policy: Option<SeafloorPolicy>,

    /// Override the number of particles.
    #[arg(long)]
    particles: Option<usize>,

    /// Override the run length in days.
    #[arg(long)]
    days: Option<f64>,

    /// Print the effective run configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Top-level layout of a scenario file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScenarioFile {
    run: RunConfig,
    scenario: Scenario,
}

/// Where, how many and for how long.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Scenario {
    /// Seeding site longitude, degrees east.
    lon: f64,
    /// Seeding site latitude, degrees north.
    lat: f64,
    /// Seeding depth in metres below the surface.
    depth: f64,
    /// Particles are spread uniformly over a disc of this radius.
    radius_m: f64,
    particles: usize,
    seed: u64,
    duration_days: f64,
    /// Development level at seeding. Backward runs need a positive level.
    initial_dev_level: f64,
    ocean: UniformOcean,
    current: Current,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Current {
    u: f64,
    v: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            lon: 4.8,
            lat: 60.0,
            depth: 50.0,
            radius_m: 1000.0,
            particles: 1000,
            seed: 0,
            duration_days: 300.0,
            initial_dev_level: 0.0,
            ocean: UniformOcean::default(),
            current: Current::default(),
        }
    }
}

impl Scenario {
    /// Seed `particles` larvae uniformly over the disc around the site.
    fn seed_ensemble(&self) -> Ensemble {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let coslat = self.lat.to_radians().cos().max(1e-6);
        let mut ensemble = Ensemble::new();
        for _ in 0..self.particles {
            let r = self.radius_m * rng.gen::<f64>().sqrt();
            let theta = TAU * rng.gen::<f64>();
            let dlat = (r * theta.cos() / EARTH_RADIUS_M).to_degrees();
            let dlon = (r * theta.sin() / (EARTH_RADIUS_M * coslat)).to_degrees();
            ensemble.seed(ParticleSeed {
                lon: self.lon + dlon,
                lat: self.lat + dlat,
                z: -self.depth.abs(),
                dev_level: self.initial_dev_level,
            });
        }
        ensemble
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let content = fs::read_to_string(&cli.scenario)
        .with_context(|| format!("failed to read {}", cli.scenario.display()))?;
    let mut file: ScenarioFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", cli.scenario.display()))?;
    apply_overrides(&cli, &mut file);
    file.run.validate().context("invalid run configuration")?;

    if cli.print_config {
        print!("{}", toml::to_string(&file.run).context("failed to render configuration")?);
        return Ok(());
    }

    let dt = file.run.dt_seconds;
    if dt == 0.0 {
        bail!("dt_seconds is zero; nothing would happen");
    }
    let steps = (file.scenario.duration_days * 86_400.0 / dt.abs()).ceil() as u64;

    let scenario = file.scenario;
    let mut sim = Simulation::new(
        file.run,
        scenario.seed_ensemble(),
        Box::new(UniformCurrent::new(scenario.current.u, scenario.current.v)),
        Box::new(scenario.ocean),
    )
    .context("failed to build simulation")?;

    tracing::info!(
        particles = scenario.particles,
        steps,
        dt,
        "starting run"
    );
    for _ in 0..steps {
        let report = sim
            .step()
            .with_context(|| format!("step {} failed", sim.current_step().next()))?;
        if report.step_id.0 % 24 == 0 {
            tracing::debug!(
                step = %report.step_id,
                active = report.metrics.active_after,
                "progress"
            );
        }
        if report.metrics.active_after == 0 {
            break;
        }
    }

    print_summary(&sim);
    Ok(())
}

fn apply_overrides(cli: &Cli, file: &mut ScenarioFile) {
    if cli.backward {
        file.run.dt_seconds = -file.run.dt_seconds.abs();
    }
    if let Some(policy) = cli.seafloor_policy {
        file.run.seafloor_policy = policy;
    }
    if let Some(n) = cli.particles {
        file.scenario.particles = n;
    }
    if let Some(days) = cli.days {
        file.scenario.duration_days = days;
    }
}

fn print_summary(sim: &Simulation) {
    let ensemble = sim.ensemble();
    println!(
        "ran {} steps ({:.1} days)",
        sim.current_step(),
        sim.elapsed_seconds() / 86_400.0
    );
    println!("{:<22}{:>8}", "outcome", "count");
    for (outcome, n) in sim.tally().iter() {
        println!("{:<22}{:>8}", outcome.reason(), n);
    }
    println!("{:<22}{:>8}", "still active", ensemble.active_count());
    for (label, n) in sim.tally().by_status_label() {
        tracing::info!(status = label, count = n, "final status");
    }
}
