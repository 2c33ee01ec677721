//! muxbncd - multiplex several IRC clients onto one upstream nick.
//!
//! One persistent connection to an IRC server is shared by any number of
//! locally attached clients: they see the same identity, the same channels,
//! and each other's channel messages.

mod config;
mod engine;
mod error;
mod handlers;
mod network;
mod state;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::{Config, LogFormat};
use crate::engine::{Engine, Event};
use crate::network::Gateway;
use crate::state::random_nick;

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
/// Falls back to `config.toml` when no argument is provided.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);

    let raw_path = match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "config.toml".to_string(),
    };

    match std::fs::canonicalize(Path::new(&raw_path)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => raw_path,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (before tracing, so we can use log_format)
    let config_path = resolve_config_path();

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("ERROR: Failed to load config from {}: {}", config_path, e);
        e
    })?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .json()
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            error!(error = %err, "Configuration validation failed");
        }
        anyhow::bail!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        );
    }

    let nick = config.upstream.nick.clone().unwrap_or_else(random_nick);

    info!(
        server = %config.upstream.server,
        port = config.upstream.port,
        nick = %nick,
        "Starting muxbncd"
    );

    let (events_tx, events_rx) = mpsc::channel::<Event>(1024);

    // Connect and register upstream first so a bad server address fails fast.
    let framed = network::upstream::connect(&config, &nick)
        .await
        .with_context(|| {
            format!(
                "failed to connect to {}:{}",
                config.upstream.server, config.upstream.port
            )
        })?;
    let upstream_tx = network::upstream::spawn(framed, events_tx.clone());

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.listen.port);
    let gateway = Gateway::bind(addr, events_tx.clone())
        .await
        .with_context(|| format!("failed to bind listen port {}", config.listen.port))?;
    tokio::spawn(gateway.run());

    let engine = Engine::new(Arc::new(config), upstream_tx, nick);
    let fatal = engine.run(events_rx).await;

    // Give client writers a moment to flush the ERROR broadcast.
    tokio::time::sleep(Duration::from_millis(200)).await;

    Err(anyhow::Error::new(fatal))
}
