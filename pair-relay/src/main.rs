//! blindpair-relay binary entry point.
//!
//! Usage:
//! ```bash
//! blindpair-relay --config blindpair.toml
//! blindpair-relay --help
//! ```
//!
//! Runs the relay with the console transport on stdin/stdout and serves
//! `/health` and `/metrics` over HTTP.

use anyhow::{Context, Result};
use blindpair_relay::cleanup::spawn_maintenance_task;
use blindpair_relay::config::Config;
use blindpair_relay::console::{self, ConsoleNotifier};
use blindpair_relay::http::{build_router, init_start_time};
use blindpair_relay::server::ChatRelay;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Anonymous one-on-one chat pairing and relay service.
#[derive(Parser, Debug)]
#[command(name = "blindpair-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(long, short, default_value = "blindpair.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_exists = cli.config.exists();
    let config = if config_exists {
        Config::from_file(&cli.config)?
    } else {
        Config::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if config_exists {
        tracing::info!("Loaded configuration from {}", cli.config.display());
    } else {
        tracing::info!(
            "No configuration at {}, using defaults",
            cli.config.display()
        );
    }

    init_start_time();

    let notifier = Arc::new(ConsoleNotifier::new());
    let relay = Arc::new(ChatRelay::new(config.clone(), notifier)?);

    let maintenance = spawn_maintenance_task(relay.clone(), config.maintenance.clone());

    if config.http.enabled {
        let listener = tokio::net::TcpListener::bind(&config.http.bind_address)
            .await
            .with_context(|| format!("failed to bind HTTP on {}", config.http.bind_address))?;
        tracing::info!("HTTP endpoints listening on {}", config.http.bind_address);

        let app = build_router(relay.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    tracing::info!(
        "blindpair-relay v{} ready; enter `<user-id> <text>` lines",
        env!("CARGO_PKG_VERSION")
    );

    tokio::select! {
        result = console::run(relay, BufReader::new(tokio::io::stdin())) => {
            result.context("console input failed")?;
            tracing::info!("Input closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    maintenance.abort();
    Ok(())
}
