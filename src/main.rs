//! Allowlisted HTTP Forwarding Proxy
//!
//! Accepts inbound HTTP requests, checks the requested destination against
//! an allowlist of host patterns, rewrites the request and relays the
//! downstream response.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────────┐
//!                        │                 FORWARDING PROXY                  │
//!                        │                                                   │
//!   GET /proxy/{ep}      │  ┌──────────┐   ┌──────────┐   ┌─────────────┐    │
//!   POST /odata/{ep}  ───┼─▶│  http    │──▶│  target  │──▶│  allowlist  │    │
//!                        │  │ handlers │   │ resolver │   │   matcher   │    │
//!                        │  └──────────┘   └──────────┘   └──────┬──────┘    │
//!                        │                                       │ approved  │
//!                        │                                       ▼           │
//!                        │  ┌──────────┐   ┌──────────┐   ┌─────────────┐    │
//!   Client Response  ◀───┼──│ response │◀──│forwarder │◀──│  rewriter   │    │
//!                        │  │  filter  │   │ (reqwest)│   │ query/hdrs  │    │
//!                        │  └──────────┘   └────┬─────┘   └─────────────┘    │
//!                        │                      │                            │
//!                        └──────────────────────┼────────────────────────────┘
//!                                               ▼
//!                                          Destination
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forwarding_proxy::config::{load_config, ProxyConfig};
use forwarding_proxy::lifecycle::{signals, Shutdown};
use forwarding_proxy::observability::{logging, metrics};
use forwarding_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "forwarding-proxy")]
#[command(about = "HTTP forwarding proxy with a destination allowlist", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!("forwarding-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
