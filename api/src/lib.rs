//! HTTP surface for the question-answering pipeline.
//!
//! Routes:
//! - `POST   /ask`         : answer a question, optionally inside a session
//! - `GET    /history/{id}`: turns of a session
//! - `DELETE /history/{id}`: end a session
//! - `GET    /health`      : corpus size and completion backend probe

use std::sync::Arc;

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::{AppState, SessionPolicy, SharedSession};
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        ask::ask_question_route::ask_question,
        health::health_route::health,
        history::history_route::{end_session, get_history},
    },
};

/// Default bind address when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// `API_ADDRESS` or [`DEFAULT_API_ADDRESS`].
pub fn address_from_env() -> String {
    std::env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string())
}

/// Builds the router with all routes and the JSON error mapper.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask", post(ask_question))
        .route("/history/{id}", get(get_history).delete(end_session))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves until Ctrl+C.
///
/// # Errors
/// [`AppError::Bind`] if `addr` cannot be bound, [`AppError::Server`] if the
/// server stops with an IO error.
pub async fn start(state: Arc<AppState>, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!(
        %addr,
        corpus_chunks = state.contextor.store().len(),
        "API listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
