//! GET /health: corpus size and completion backend probe.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub corpus_chunks: usize,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<HealthStatus>,
}

/// Handler: GET /health
///
/// 200 with `success: true` unless the backend probe reports `ok: false`,
/// in which case 503 with the same body.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let llm = match &state.llm {
        Some(svc) => Some(svc.health().await),
        None => None,
    };
    let healthy = llm.as_ref().is_none_or(|s| s.ok);

    let body = HealthResponse {
        corpus_chunks: state.contextor.store().len(),
        sessions: state.session_count().await,
        llm,
    };

    let mut resp = ApiResponse::success(body);
    resp.success = healthy;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    resp.into_response_with_status(status)
}
