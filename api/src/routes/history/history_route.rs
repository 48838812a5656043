//! GET/DELETE /history/{id}: read or end a conversation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::{EndSessionResponse, HistoryResponse},
};

/// Handler: GET /history/{id}
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let session = state
        .find_session(&id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    let turns = session.lock().await.history().to_vec();

    Ok(ApiResponse::success(HistoryResponse {
        session_id: id,
        turns,
    })
    .into_response_with_status(StatusCode::OK))
}

/// Handler: DELETE /history/{id}
///
/// Ends the session; its history is discarded.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let session = state
        .end_session(&id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    let turns = {
        let mut s = session.lock().await;
        let n = s.history().len();
        s.clear();
        n
    };
    info!(session_id = %id, turns, "session ended");

    Ok(ApiResponse::success(EndSessionResponse {
        session_id: id,
        removed_turns: turns,
    })
    .into_response_with_status(StatusCode::OK))
}
