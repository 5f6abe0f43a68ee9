//! Local forwarding proxy with retry.
//!
//! Binds a local listener and relays everything through a single fixed
//! upstream proxy: plain requests via the retrying forwarder, CONNECT
//! sessions via the raw tunnel relay.

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::{loader, ProxyConfig};
use forward_proxy::net::listener::Listener;
use forward_proxy::observability::logging;
use forward_proxy::ProxyServer;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forwarding proxy that retries through a fixed upstream proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        upstream = %config.upstream.url(),
        retry_attempts = config.retries.max_attempts,
        attempt_timeout_secs = config.timeouts.attempt_secs,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;
    tracing::info!(address = %listener.local_addr()?, "Local proxy server listening");

    let server = ProxyServer::new(config)?;
    tokio::select! {
        result = server.run(listener) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
