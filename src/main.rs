//! netdiag - Network Diagnostics Service
//!
//! Runs ping, traceroute, netstat, interface and name-lookup probes against a
//! target and serves the parsed, consolidated report over HTTP.

mod config;
mod diagnostics;
mod metrics;
mod parse;
mod platform;
mod probe;
mod web;

use config::ServerConfig;
use diagnostics::Diagnostics;
use probe::SystemRunner;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("netdiag=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting netdiag on port {}...", cfg.http_port);
    tracing::info!(
        "Probing with {} tools, {:?} timeout per probe, {} concurrent runs",
        cfg.platform,
        cfg.probe_timeout,
        cfg.max_concurrent_runs
    );

    let diagnostics = Arc::new(Diagnostics::new(SystemRunner, &cfg));

    // Start web server
    let server = Server::new(cfg, diagnostics);
    server.start().await?;

    Ok(())
}
