//! printwatch-api — REST API for the printer liveness monitor.
//!
//! Serves the roster and the latest sweep summary. No handler ever runs
//! a sweep synchronously; `POST /sweep` only asks the background loop
//! for one.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/healthz` | Process liveness |
//! | GET | `/api/v1/printers` | Roster listing |
//! | GET | `/api/v1/printers/status` | Latest liveness state |
//! | GET | `/api/v1/printers/status/{id}` | Latest results for one printer id |
//! | POST | `/api/v1/printers/sweep` | Request an immediate sweep |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;
pub mod prometheus;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use printwatch_health::LivenessMonitor;

pub use prometheus::render_prometheus;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub monitor: Arc<LivenessMonitor>,
}

/// Build the complete API router (REST + metrics).
pub fn build_router(monitor: Arc<LivenessMonitor>) -> Router {
    let state = ApiState { monitor };

    let api_routes = Router::new()
        .route("/printers", get(handlers::list_printers))
        .route("/printers/status", get(handlers::get_status))
        .route("/printers/status/{id}", get(handlers::get_printer_status))
        .route("/printers/sweep", post(handlers::request_sweep))
        .with_state(state.clone());

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics).with_state(state))
}
