// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! edp-relayd: relays local unit changes to the remote unit API.
//!
//! Startup reconciles local and remote units, retrying until the API is
//! reachable. The relay loop then drains the outbox at a fixed interval.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use edp_core::Database;
use edp_relay::config::{self, Config, ConfigProvider};
use edp_relay::startup::retry_until_ready;
use edp_relay::{
    reconcile, Error, ReconcileOptions, Relay, RelayOptions, RemoteClient, Result,
};
use tracing::{error, info};

/// Relay local unit changes to the remote unit API
#[derive(Parser, Debug)]
#[command(name = "edp-relayd", version)]
#[command(about = "Relays unit status and position changes from the local outbox to the remote unit API")]
struct Args {
    /// Configuration file (default: edp-relay.toml in WORK_DIR or the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run a single relay cycle after startup and exit
    #[arg(long)]
    once: bool,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.log_file.as_deref());

    if let Err(e) = run(args) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> Result<()> {
    let path = args.config.unwrap_or_else(config::default_path);
    let provider = ConfigProvider::load(&path)?;
    let config = Config::from_provider(&provider)?;

    if !config.api_enabled {
        info!("API disabled, nothing to relay");
        return Ok(());
    }

    info!("Starting edp-relayd");
    info!("  API: {}", config.api.url);
    info!("  Database: {}", config.db_path.display());
    info!("  Interval: {}s", config.relay_interval.as_secs());

    let db = Database::open(&config.db_path)?;
    let mut client = RemoteClient::new(&config.api)
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

    let options = ReconcileOptions {
        push_local: config.upload_units,
    };
    let mapping = retry_until_ready(
        config.startup_retry,
        || {
            if !client.verify_connection() {
                return Err(Error::RemoteUnavailable(format!(
                    "cannot reach {}",
                    config.api.url
                )));
            }
            let (mapping, _) = reconcile(&db, &mut client, options)?;
            Ok(mapping)
        },
        std::thread::sleep,
    )?;

    if !config.relay_enabled {
        info!("live connection disabled, exiting after reconciliation");
        return Ok(());
    }

    let mut relay = Relay::new(
        db,
        client,
        mapping,
        RelayOptions {
            interval: config.relay_interval,
            max_attempts: config.max_attempts,
        },
    );
    if args.once {
        relay.run_cycle()?;
        return Ok(());
    }
    relay.run()?;
    Ok(())
}

fn setup_logging(log_file: Option<&Path>) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Fall back to stderr if the log file cannot be opened
    let file = log_file.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
