//! fleetscaled, the fleetscale daemon.
//!
//! Reads a YAML policy file describing runner groups, validates it, and
//! drives the scheduler: one reconciliation per group per poll tick.
//! The policy file is re-read at the top of every tick, so edits take
//! effect without a restart.
//!
//! The `run` subcommand drives the in-memory providers, which makes it
//! a deterministic simulation harness for policy files. Production
//! deployments embed the fleetscale crates and supply
//! `RunnerDirectory`/`JobOrchestrator` implementations for their CI
//! provider and compute backend.
//!
//! # Usage
//!
//! ```text
//! fleetscaled run --config /etc/fleetscale/runners.yaml
//! fleetscaled check --config /etc/fleetscale/runners.yaml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use fleetscale_core::{FleetConfig, GroupPolicy, LoadedConfig};
use fleetscale_provider::{InMemoryDirectory, InMemoryOrchestrator};
use fleetscale_scheduler::Poller;

#[derive(Parser)]
#[command(name = "fleetscaled", about = "Fleetscale runner autoscaler daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the policy file and run the polling loop.
    Run {
        /// Path to the runner groups policy file.
        #[arg(long, default_value = "/etc/fleetscale/runners.yaml")]
        config: PathBuf,

        /// Stop after this many poll ticks (runs forever when omitted).
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Validate the policy file and exit.
    Check {
        /// Path to the runner groups policy file.
        #[arg(long, default_value = "/etc/fleetscale/runners.yaml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleetscaled=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, ticks } => run(config, ticks).await,
        Command::Check { config } => check(&config),
    }
}

/// Load and validate the policy file, or exit with code 1.
fn load(path: &Path) -> LoadedConfig {
    let loaded = FleetConfig::from_file(path).and_then(FleetConfig::validate);
    match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("fleetscaled: configuration error: {err}");
            std::process::exit(1);
        }
    }
}

fn check(config: &Path) {
    let loaded = load(config);
    info!(
        path = %config.display(),
        groups = loaded.policies.len(),
        "configuration valid"
    );
}

async fn run(config: PathBuf, ticks: Option<u64>) {
    info!(path = %config.display(), "configuration file provided");

    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    let poller = Poller::new(directory, orchestrator);

    let mut completed: u64 = 0;

    loop {
        let loaded = load(&config);
        let constants = Arc::new(loaded.constants);
        let policies: Vec<Arc<GroupPolicy>> =
            loaded.policies.into_iter().map(Arc::new).collect();

        let summary = poller.tick(&policies, &constants).await;
        completed += 1;

        info!(
            tick = completed,
            groups = summary.groups,
            failures = summary.failures,
            "tick complete"
        );

        if let Some(max) = ticks
            && completed >= max
        {
            info!(ticks = completed, "configured tick count reached, stopping");
            return;
        }

        info!(
            seconds = constants.poll_interval_seconds,
            "next attempt scheduled"
        );

        tokio::select! {
            _ = tokio::time::sleep(constants.poll_interval()) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                return;
            }
        }
    }
}
