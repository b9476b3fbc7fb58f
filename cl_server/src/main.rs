//! Club league HTTP server.
//!
//! Runs one league engine over an in-memory store, optionally restored from
//! and saved to a JSON snapshot.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Error};
use cl_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use club_league::{LeagueEngine, LeagueStore, StoreSnapshot, notify::LogNotifier};
use pico_args::Arguments;

const HELP: &str = "\
Run the club league server

USAGE:
  cl_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --snapshot   PATH        Store snapshot to load on startup and save on shutdown  [default: env SNAPSHOT_PATH]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus scrape address (disabled when unset)
  SNAPSHOT_PATH            Store snapshot file
  RUST_LOG                 Log filter (default: info)
  LEAGUE_*                 Engine settings (join codes, points, policies, notifications)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let snapshot: Option<PathBuf> = pargs.opt_value_from_str("--snapshot")?;

    logging::init();

    let config = ServerConfig::from_env(bind, snapshot)?;
    config.validate()?;
    tracing::info!("Starting club league server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let store = match &config.snapshot_path {
        Some(path) if path.exists() => Arc::new(load_snapshot(path)?),
        _ => Arc::new(LeagueStore::new()),
    };
    let stats = store.stats().await;
    tracing::info!(
        leagues = stats.leagues,
        rating_tiers = stats.rating_tiers,
        groups = stats.groups,
        matches = stats.matches,
        "League store ready"
    );

    let engine = LeagueEngine::with_store(&config.engine, Arc::new(LogNotifier), store)?;
    let app = api::create_router(AppState {
        engine: engine.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    engine.events.flush().await;

    if let Some(path) = &config.snapshot_path {
        save_snapshot(path, &engine.store.snapshot().await)?;
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<LeagueStore, Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed snapshot {}", path.display()))?;
    let store = LeagueStore::from_snapshot(snapshot)?;
    tracing::info!("Restored league store from {}", path.display());
    Ok(store)
}

fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<(), Error> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    // Replace the snapshot atomically
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;
    tracing::info!("Saved league store to {}", path.display());
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
