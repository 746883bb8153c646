//! Edge Request Gateway
//!
//! A production-ready access-control gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────────┐
//!                     │                   EDGE GATEWAY                      │
//!                     │                                                     │
//!   Client Request    │  ┌──────────┐   ┌───────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│ listener │──▶│ exclusion │──▶│  rate guard  │   │
//!                     │  └──────────┘   │  bypass   │   │ (API paths)  │   │
//!                     │                 └───────────┘   └──────┬───────┘   │
//!                     │                                        │           │
//!                     │                                        ▼           │
//!                     │  ┌───────────┐   ┌───────────┐  ┌──────────────┐   │
//!   Client Response   │  │ security  │◀──│  category │◀─│   session    │   │
//!   ◀─────────────────┼──│  headers  │   │  guards   │  │  resolution  │   │
//!                     │  └───────────┘   └───────────┘  └──────────────┘   │
//!                     │                                                     │
//!                     │  ┌─────────────────────────────────────────────┐   │
//!                     │  │            Cross-Cutting Concerns            │   │
//!                     │  │  ┌────────┐ ┌─────────────┐ ┌────────────┐  │   │
//!                     │  │  │ config │ │observability│ │ lifecycle  │  │   │
//!                     │  │  └────────┘ └─────────────┘ └────────────┘  │   │
//!                     │  └─────────────────────────────────────────────┘   │
//!                     └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::{load_config, GatewayConfig};
use edge_gateway::http::GatewayServer;
use edge_gateway::observability::{logging, metrics};
use edge_gateway::session::AnonymousResolver;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Access-control gateway for inbound HTTP traffic", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when absent.
    #[arg(short, long)]
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

    tracing::info!("edge-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
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

    // The session-resolution capability is deployment-specific; the default
    // binary treats every request as anonymous.
    let server = GatewayServer::new(config, Arc::new(AnonymousResolver));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
