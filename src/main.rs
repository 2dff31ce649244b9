//! Daily check-in keeper.
//!
//! Calls `checkIn(referrer)` once a day for every configured wallet,
//! skipping wallets the contract already counts as checked in.
//!
//! # Architecture Overview
//!
//! ```text
//!   .env / env / --config file
//!            │
//!            ▼
//!   ┌─────────────────┐     ┌──────────────────┐
//!   │     config      │────▶│    lifecycle     │
//!   │ load + validate │     │ startup, signals │
//!   └─────────────────┘     └────────┬─────────┘
//!                                    │
//!                                    ▼
//!                          ┌───────────────────┐
//!                          │  WalletScheduler  │  cycle → sleep → cycle
//!                          └────────┬──────────┘
//!                                   │ one wallet at a time
//!                                   ▼
//!                          ┌───────────────────┐      ┌─────────────┐
//!                          │  CheckinExecutor  │─────▶│   journal   │
//!                          │ fees → sign → send│      └─────────────┘
//!                          └────────┬──────────┘
//!                                   │ Ledger
//!                                   ▼
//!                          ┌───────────────────┐
//!                          │ blockchain client │──▶ RPC (+ failovers)
//!                          └───────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use checkin_keeper::config::{load_config, ConfigError};
use checkin_keeper::lifecycle::{build_scheduler, spawn_signal_handler, Shutdown};
use checkin_keeper::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(
    name = "checkin-keeper",
    version,
    about = "Daily on-chain check-ins for a set of wallets"
)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("checkin-keeper: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ConfigError> {
    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!("checkin-keeper v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let scheduler = build_scheduler(&config).await?;
    tracing::info!(
        wallets = scheduler.wallets().len(),
        wallet_delay_secs = config.schedule.wallet_delay_secs,
        cycle_interval_secs = config.schedule.cycle_interval_secs,
        "Scheduler ready"
    );

    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    if cli.once {
        let report = scheduler.run_cycle(&mut rx).await;
        tracing::info!(%report, "Single cycle finished");
    } else {
        let cycles = scheduler.run(rx).await;
        tracing::info!(cycles, "Scheduler stopped");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
