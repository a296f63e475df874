//! EPP gateway.
//!
//! ```text
//!   Client ──▶ location match ──▶ EPP interception ──▶ internal redirect ──▶ endpoint
//!                  │                   │
//!           seed variables     resolver (header | HTTP picker)
//! ```
//!
//! Picker failures are logged and the request continues (fail-open); the
//! internal location decides what an unset endpoint means.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use epp_gateway::config::{load_config, GatewayConfig};
use epp_gateway::lifecycle::{wait_for_signal, Shutdown};
use epp_gateway::observability::{logging, metrics};
use epp_gateway::GatewayServer;

#[derive(Parser, Debug)]
#[command(name = "epp-gateway", version, about = "Endpoint picker gateway")]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "EPP_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("epp-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        resolve_timeout_ms = config.epp.resolve_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
