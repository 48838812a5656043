//! POST /ask: answers a question over the corpus.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::Response};
use contextor::{AskOptions, QaAnswer};
use tracing::{debug, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// Always 200 once the body parses: a failing completion service yields the
/// fallback answer with `fallback: true`.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What share of youth speak English?","session_id":"demo"}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> Response {
    let opts = AskOptions {
        top_k: body.top_k.unwrap_or(0),
    };
    debug!(
        session_id = body.session_id.as_deref().unwrap_or("-"),
        question_len = body.question.len(),
        top_k = opts.top_k,
        "ask: start"
    );

    let QaAnswer {
        answer,
        context,
        fallback,
    } = match body.session_id.as_deref() {
        Some(id) => {
            let session = state.session(id).await;
            // Held until both turns are recorded: one question per session at a time.
            let mut session = session.lock().await;
            session.ask(&state.contextor, &body.question, opts).await
        }
        None => state.contextor.answer(&body.question, opts).await,
    };

    info!(
        session_id = body.session_id.as_deref().unwrap_or("-"),
        context = context.len(),
        fallback,
        "ask: done"
    );

    ApiResponse::success(AskResponse {
        answer,
        fallback,
        context,
        session_id: body.session_id,
    })
    .into_response_with_status(StatusCode::OK)
}
