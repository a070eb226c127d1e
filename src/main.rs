//! Medical claim settlement gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                CLAIM GATEWAY                    │
//!                      │                                                 │
//!   Billing document   │  ┌────────┐   ┌────────────┐   ┌────────────┐ │
//!   ──────────────────▶│  │  http  │──▶│ extraction │──▶│   claims   │ │
//!                      │  │ server │   │ (AI model) │   │ (payable)  │ │
//!                      │  └────────┘   └────────────┘   └─────┬──────┘ │
//!                      │                                       │        │
//!                      │                                       ▼        │
//!   Transaction hash   │  ┌────────┐   ┌────────────┐   ┌────────────┐ │
//!   ◀──────────────────│  │ store  │◀──│ settlement │◀──│ blockchain │ │
//!                      │  │(claims)│   │ (contract) │   │ (RPC+sign) │ │
//!                      │  └────────┘   └────────────┘   └────────────┘ │
//!                      │                                                 │
//!                      │  config · observability (logs, metrics)        │
//!                      └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use mediclaim_gateway::config::loader::load_config;
use mediclaim_gateway::observability::{logging, metrics};
use mediclaim_gateway::{GatewayConfig, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "mediclaim-gateway", about = "Medical claim settlement gateway")]
struct Args {
    /// Path to the TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("mediclaim-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        extraction_enabled = config.extraction.enabled,
        blockchain_enabled = config.blockchain.enabled,
        store_backend = ?config.store.backend,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

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

    let server = HttpServer::from_config(config).await;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
