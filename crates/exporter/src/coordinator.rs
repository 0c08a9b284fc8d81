//! [`ReloadCoordinator`]: owns the active deadline set and its published metrics.
//!
//! The active set and the metric families sit behind one `RwLock`. Periodic
//! evaluation and scrapes take the read side; a reload decodes the new file
//! first and then, under the write side, unregisters the families, registers
//! fresh ones, swaps the active set and publishes it. A scrape therefore never
//! observes the families half-rebuilt, and a failed decode changes nothing.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{error, info};

use countdown_deadlines::{DeadlineSet, DeadlineSource, LoadError};

use crate::publisher::{MetricsError, MetricsPublisher, PublishSummary};

/// Why a reload was abandoned.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to load deadlines: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("deadlines load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

struct ExporterState {
    active: DeadlineSet,
    publisher: MetricsPublisher,
}

/// Serialises periodic evaluation, reloads and scrapes over shared state.
pub struct ReloadCoordinator {
    source: DeadlineSource,
    state: RwLock<ExporterState>,
}

impl ReloadCoordinator {
    /// Wrap an initially loaded set. Nothing is published until the first evaluation.
    pub fn new(source: DeadlineSource, initial: DeadlineSet, publisher: MetricsPublisher) -> Self {
        Self {
            source,
            state: RwLock::new(ExporterState {
                active: initial,
                publisher,
            }),
        }
    }

    pub fn source(&self) -> &DeadlineSource {
        &self.source
    }

    /// Evaluate the active set against the current time and publish it.
    pub async fn evaluate(&self) -> PublishSummary {
        self.evaluate_at(Utc::now()).await
    }

    /// Evaluate the active set at `now` and publish it.
    pub async fn evaluate_at(&self, now: DateTime<Utc>) -> PublishSummary {
        let state = self.state.read().await;
        state.publisher.publish(&state.active, now)
    }

    /// Re-read the source and atomically replace the active set and its metrics.
    pub async fn reload(&self) -> Result<PublishSummary, ReloadError> {
        self.reload_at(Utc::now()).await
    }

    /// [`reload`](Self::reload) with an explicit evaluation instant.
    ///
    /// The file is read on the blocking pool. On a load failure the previous
    /// set and all published series stay in force.
    pub async fn reload_at(&self, now: DateTime<Utc>) -> Result<PublishSummary, ReloadError> {
        let source = self.source.clone();
        let loaded = tokio::task::spawn_blocking(move || source.load()).await?;
        let next = match loaded {
            Ok(set) => set,
            Err(e) => {
                error!(
                    path = %self.source.path.display(),
                    error = %e,
                    "failed to reload deadlines, keeping previous configuration"
                );
                return Err(e.into());
            }
        };

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if let Err(e) = state.publisher.clear() {
            error!(error = %e, "failed to rebuild metric families during reload");
            return Err(e.into());
        }
        let previous = state.active.len();
        state.active = next;
        let summary = state.publisher.publish(&state.active, now);

        info!(
            path = %self.source.path.display(),
            previous,
            deadlines = state.active.len(),
            tripped = summary.tripped,
            expired = summary.expired,
            "reloaded deadlines"
        );
        Ok(summary)
    }

    /// Encode the current metrics for a scrape.
    pub async fn encode_text(&self) -> Result<String, MetricsError> {
        self.state.read().await.publisher.encode_text()
    }

    /// Snapshot of the active set.
    pub async fn active(&self) -> DeadlineSet {
        self.state.read().await.active.clone()
    }

    /// Number of label sets in `countdown_timers`.
    pub async fn series_count(&self) -> usize {
        self.state.read().await.publisher.series_count()
    }
}
