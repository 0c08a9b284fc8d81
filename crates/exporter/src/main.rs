//! countdown-exporter: Prometheus exporter for deadline countdowns.
//!
//! Loads a YAML or JSON deadlines file, re-evaluates it on a fixed interval
//! and serves the result on `/metrics`. Send SIGHUP (or pass `--watch`) to
//! reload the file without restarting.
//!
//! # Usage
//!
//! ```bash
//! countdown-exporter --deadlines-file data/deadlines.example.yaml --port 9208
//!
//! # Via environment variables
//! COUNTDOWN_EXPTR_DEADLINES_FILE=deadlines.json COUNTDOWN_EXPTR_DEADLINES_FILE_TYPE=json countdown-exporter
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{watch, Notify};

use countdown_deadlines::DeadlineLoader;
use countdown_exporter::config::Cli;
use countdown_exporter::coordinator::ReloadCoordinator;
use countdown_exporter::publisher::MetricsPublisher;
use countdown_exporter::{server, tasks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(?cli, "starting countdown-exporter");
    let config = cli.into_config().context("invalid configuration")?;

    let mut loader = DeadlineLoader::new(config.source.clone());
    let initial = loader
        .load()
        .with_context(|| format!("failed to load deadlines from {}", config.source.path.display()))?;

    let publisher = MetricsPublisher::new().context("failed to register metrics")?;
    let coordinator = Arc::new(ReloadCoordinator::new(config.source.clone(), initial, publisher));

    let file_changed = if config.watch {
        let notify = Arc::new(Notify::new());
        loader
            .watch(notify.clone())
            .context("failed to watch deadlines file")?;
        Some(notify)
    } else {
        None
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = server::spawn_metrics_server(listener, coordinator.clone(), shutdown_rx.clone());
    let ticker = tasks::spawn_tick_task(coordinator.clone(), config.check_interval, shutdown_rx.clone());
    let reloader = tasks::spawn_reload_task(coordinator, file_changed, shutdown_rx)
        .context("failed to install SIGHUP handler")?;

    tracing::info!(
        addr = %config.listen_addr,
        interval_secs = config.check_interval.as_secs(),
        watching = loader.is_watching(),
        "countdown-exporter ready"
    );

    tasks::shutdown_signal().await;
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    for (name, handle) in [("server", server), ("evaluation", ticker), ("reload", reloader)] {
        if let Err(e) = handle.await {
            tracing::error!(task = name, error = %e, "task panicked");
        }
    }

    // Keep the watcher alive until every task has stopped.
    drop(loader);

    tracing::info!("countdown-exporter exited cleanly");
    Ok(())
}
