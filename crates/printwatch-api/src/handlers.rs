//! REST API handlers.
//!
//! Every handler reads the monitor's cached state and returns JSON.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use printwatch_health::LivenessState;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Roster ─────────────────────────────────────────────────────

/// GET /api/v1/printers
pub async fn list_printers(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.monitor.roster().list().to_vec())
}

// ── Status ─────────────────────────────────────────────────────

/// GET /api/v1/printers/status
///
/// Returns the cached state; `{"state": "initializing"}` until the
/// first sweep completes.
pub async fn get_status(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.monitor.latest())
}

/// GET /api/v1/printers/status/{id}
///
/// A roster may reuse an id, so the payload is a list.
pub async fn get_printer_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !state.monitor.roster().list().iter().any(|d| d.id == id) {
        return error_response("printer not found", StatusCode::NOT_FOUND).into_response();
    }

    match state.monitor.latest() {
        LivenessState::Initializing => {
            error_response("first sweep not finished", StatusCode::SERVICE_UNAVAILABLE)
                .into_response()
        }
        LivenessState::Ready(summary) => {
            let results: Vec<_> = summary.find(&id).into_iter().cloned().collect();
            ApiResponse::ok(results).into_response()
        }
    }
}

/// POST /api/v1/printers/sweep
pub async fn request_sweep(State(state): State<ApiState>) -> impl IntoResponse {
    if !state.monitor.request_sweep().await {
        return error_response("liveness monitor is not running", StatusCode::SERVICE_UNAVAILABLE)
            .into_response();
    }
    info!("sweep requested over the API");
    (
        StatusCode::ACCEPTED,
        ApiResponse::ok(serde_json::json!({ "status": "sweep requested" })),
    )
        .into_response()
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let latest = state.monitor.latest();
    let body = crate::prometheus::render_prometheus(latest.summary().map(|s| s.as_ref()));
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
