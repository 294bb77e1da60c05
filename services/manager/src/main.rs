//! steward simulator
//!
//! Runs the job scheduler headless against a seeded in-memory world: one job
//! of each kind, colonists fulfilling designations at a fixed rate, progress
//! logged as it goes.
//!
//! ## Environment
//!
//! - `STEWARD_TICKS`: ticks to simulate
//! - `STEWARD_SEED`: world generation seed
//! - `STEWARD_LOG_LEVEL`: default filter when `RUST_LOG` is unset
//! - `STEWARD_LOG_JSON`: `1` for JSON logs
//! - `STEWARD_SNAPSHOT_PATH`: write job records here on exit
//! - `STEWARD_WORK_RATE`: designations fulfilled per 100 ticks

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod sim;

use sim::{SimConfig, Simulation};

fn main() -> Result<()> {
    let config = SimConfig::from_env()?;

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!(
        ticks = config.ticks,
        seed = config.seed,
        work_rate = config.work_rate,
        "Starting steward simulator"
    );

    let mut simulation = Simulation::new(&config);
    simulation.run(config.ticks);
    simulation.report();

    if let Some(path) = &config.snapshot_path {
        let json = serde_json::to_string_pretty(&simulation.snapshot())
            .context("failed to serialize job records")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {path}"))?;
        info!(path = %path, "Snapshot written");
    }

    Ok(())
}
