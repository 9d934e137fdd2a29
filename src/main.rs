//! Relay configuration synchronizer (v1)
//!
//! Backend for a multi-platform restreaming dashboard. It turns per-platform
//! stream keys into the relay block of a media server's config and reloads
//! the server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Dashboard                 ┌──────────────────────────────────────────────┐
//!   ──────────────────────────┼─▶ http (axum)                                │
//!   POST /api/startRelay      │     │  validate → RelayRequest               │
//!   POST /api/stopRelay       │     ▼                                        │
//!                             │   relay::RelaySynchronizer  (one gate)       │
//!                             │     │ render ─▶ write ─▶ reload              │
//!                             └─────┼──────────┼─────────┼───────────────────┘
//!                                   │          ▼         ▼
//!                                   │   relay.conf    `systemctl reload srs`
//!                                   │          └────▶ media server ─▶ YouTube /
//!                                   │                                Facebook / Twitch
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use relay_sync::config::load_config_with;
use relay_sync::lifecycle::{signals, Shutdown};
use relay_sync::observability::{logging, metrics};
use relay_sync::HttpServer;

#[derive(Parser)]
#[command(name = "relay-sync", version)]
#[command(about = "Writes media server relay config from dashboard stream keys and reloads it", long_about = None)]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config_with(args.config.as_deref(), |config| {
        if let Some(bind) = args.bind {
            config.listener.bind_address = bind;
        }
    })?;

    logging::init_logging(&config.observability)?;

    tracing::info!("relay-sync v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        config_file = %config.relay.config_file,
        reload_timeout_secs = config.relay.reload_timeout_secs,
        on_reload_failure = ?config.relay.on_reload_failure,
        strict_validation = config.security.strict_validation,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
