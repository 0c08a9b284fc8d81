//! Background tasks: periodic evaluation, reload triggers and shutdown.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::coordinator::ReloadCoordinator;

/// Quiet period after a file-change notification before reloading.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Spawn the task that re-evaluates the active deadlines every `period`.
///
/// The first evaluation happens immediately.
pub fn spawn_tick_task(
    coordinator: Arc<ReloadCoordinator>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let summary = coordinator.evaluate().await;
                    debug!(
                        published = summary.published,
                        tripped = summary.tripped,
                        expired = summary.expired,
                        degraded = summary.degraded,
                        "evaluated deadlines"
                    );
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("evaluation task stopped");
    })
}

// ── Reload triggers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReloadTrigger {
    Hangup,
    FileChanged,
}

impl fmt::Display for ReloadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadTrigger::Hangup => write!(f, "SIGHUP"),
            ReloadTrigger::FileChanged => write!(f, "file change"),
        }
    }
}

/// SIGHUP stream; never fires on platforms without it.
struct Hangup {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
}

impl Hangup {
    fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            inner: tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> Option<()> {
        #[cfg(unix)]
        {
            self.inner.recv().await
        }
        #[cfg(not(unix))]
        {
            std::future::pending().await
        }
    }
}

async fn file_changed(notify: Option<&Notify>) {
    match notify {
        Some(n) => n.notified().await,
        None => std::future::pending().await,
    }
}

/// Wait until no further change has been signalled for [`RELOAD_DEBOUNCE`].
async fn settle(notify: &Notify) {
    while tokio::time::timeout(RELOAD_DEBOUNCE, notify.notified()).await.is_ok() {}
}

/// Spawn the task that reloads the deadlines file on SIGHUP or, when
/// `file_changed` is given, whenever the watcher signals it.
///
/// Fails only if the SIGHUP handler cannot be installed.
pub fn spawn_reload_task(
    coordinator: Arc<ReloadCoordinator>,
    file_changed_signal: Option<Arc<Notify>>,
    mut shutdown: watch::Receiver<bool>,
) -> io::Result<JoinHandle<()>> {
    let mut hangup = Hangup::new()?;

    Ok(tokio::spawn(async move {
        loop {
            let trigger = tokio::select! {
                sig = hangup.recv() => match sig {
                    Some(()) => ReloadTrigger::Hangup,
                    None => {
                        warn!("SIGHUP stream closed, reload on signal disabled");
                        break;
                    }
                },
                _ = file_changed(file_changed_signal.as_deref()) => ReloadTrigger::FileChanged,
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };

            if let (ReloadTrigger::FileChanged, Some(notify)) = (trigger, file_changed_signal.as_deref()) {
                settle(notify).await;
            }

            info!(%trigger, "reloading deadlines");
            // Failures are logged by the coordinator; the previous set stays active.
            let _ = coordinator.reload().await;
        }
        debug!("reload task stopped");
    }))
}

// ── Shutdown ─────────────────────────────────────────────────────────

/// Wait for SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
