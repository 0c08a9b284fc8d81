//! HTTP exposure of the published metrics.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /metrics` | Prometheus text exposition |
//! | `GET /health` | `ok` |

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::coordinator::ReloadCoordinator;

/// Build the exporter router.
pub fn router(coordinator: Arc<ReloadCoordinator>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(coordinator)
}

/// Serve [`router`] on an already bound listener until `shutdown` flips to `true`.
pub fn spawn_metrics_server(
    listener: TcpListener,
    coordinator: Arc<ReloadCoordinator>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(coordinator);

        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "metrics HTTP server listening"),
            Err(e) => tracing::warn!(error = %e, "metrics HTTP server listening on unknown address"),
        }

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut rx = shutdown;
                while !*rx.borrow() {
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;

        if let Err(e) = result {
            tracing::error!(error = %e, "metrics HTTP server failed");
        }
        tracing::info!("metrics HTTP server stopped");
    })
}

/// `GET /metrics`
async fn metrics_handler(State(coordinator): State<Arc<ReloadCoordinator>>) -> Response {
    match coordinator.encode_text().await {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `GET /health`
async fn health_handler() -> &'static str {
    "ok"
}

// ── Tests ────────────────────────────────────────────────────────────
