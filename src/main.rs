//! Declarative Reverse-Proxy Gateway
//!
//! A declarative API gateway built with Tokio and Axum: named backend
//! services expose routes with method and path rules, and one public
//! listener dispatches matching requests to the right backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                   API GATEWAY                     │
//!                          │                                                   │
//!     Client Request       │  ┌─────────┐    ┌──────────────┐    ┌─────────┐  │
//!     ─────────────────────┼─▶│  http   │───▶│   routing    │───▶│  proxy  │──┼──▶ Backend
//!                          │  │ server  │    │    table     │    │ service │  │    Service
//!                          │  └─────────┘    └──────────────┘    └─────────┘  │
//!                          │       ▲                 ▲                         │
//!                          │       │    active RoutingGeneration (atomic)     │
//!                          │       │                 │                         │
//!                          │  ┌─────────┐    ┌──────────────┐                 │
//!                          │  │ health  │    │    reload    │◀── config file  │
//!                          │  │endpoint │    │ coordinator  │      watcher    │
//!                          │  └─────────┘    └──────────────┘                 │
//!                          │                                                   │
//!                          │  ┌─────────────────────────────────────────────┐ │
//!                          │  │           Cross-Cutting Concerns            │ │
//!                          │  │  ┌────────┐ ┌─────────────┐ ┌────────────┐  │ │
//!                          │  │  │ config │ │observability│ │ lifecycle  │  │ │
//!                          │  │  └────────┘ └─────────────┘ └────────────┘  │ │
//!                          │  └─────────────────────────────────────────────┘ │
//!                          └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::loader::load_config;
use api_gateway::config::watcher::ConfigWatcher;
use api_gateway::http::Gateway;
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Declarative reverse-proxy gateway", version)]
struct Cli {
    /// Path to the gateway configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Invalid configuration is fatal at startup. Once the gateway is
    // serving, the same failure only rejects the offending reload.
    let config = load_config(&cli.config).map_err(|e| {
        eprintln!(
            "Failed to load configuration from {}: {e}",
            cli.config.display()
        );
        e
    })?;

    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        services = config.services.len(),
        "api-gateway starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let gateway = Gateway::new(&config)?;

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    // The returned watcher must stay alive for change events to keep
    // flowing; dropping it stops the watch.
    let (watcher, config_updates) = ConfigWatcher::new(&cli.config);
    let _watcher = watcher.run()?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    gateway.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
