//! bare-http demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──TCP──▶ net::Listener ──▶ http::server (one task per connection)
//!                                         │
//!                                         ▼
//!                                   http::parser ──400──┐
//!                                         │             │
//!                                         ▼             │
//!                                  app::Dispatcher      │
//!                                   │      │            │
//!                          404 ◀────┘      ▼            │
//!                                   routing::Router     │
//!                                          │            │
//!                                          ▼            │
//!                                   demo handlers       │
//!                                          │ (500 on    │
//!                                          ▼  failure)  │
//!   Client ◀──TCP── http::serializer ◀─────┴────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use bare_http::config::{load_config, ServerConfig};
use bare_http::demo::{self, InMemoryUserStore, SharedStore};
use bare_http::lifecycle::{wait_for_signal, Shutdown};
use bare_http::net::Listener;
use bare_http::observability;
use bare_http::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "bare-http")]
#[command(about = "Minimal HTTP/1.1 server with a demo users API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level, overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    observability::init(&config.observability);

    tracing::info!("bare-http v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_body_size = config.limits.max_body_size,
        read_timeout_secs = config.timeouts.read_secs,
        "Configuration loaded"
    );

    let store: SharedStore = Arc::new(InMemoryUserStore::seeded());
    let router = demo::router(store)?;

    let listener = Listener::bind(&config.listener).await?;
    let server = HttpServer::new(config, router);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
