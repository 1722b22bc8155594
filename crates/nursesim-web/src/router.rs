//! Axum router mapping all URL paths to handlers.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    cases::{case_avatar, delete_case, list_cases, save_case},
    sessions::{ask, create_session, evaluate_session, finish, speak},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Case library
        .route("/api/cases",             get(list_cases).post(save_case))
        .route("/api/cases/{id}",        delete(delete_case))
        .route("/api/cases/{id}/avatar", get(case_avatar))

        // Interview sessions
        .route("/api/sessions",               post(create_session))
        .route("/api/sessions/{id}/ask",      post(ask))
        .route("/api/sessions/{id}/speak",    post(speak))
        .route("/api/sessions/{id}/finish",   post(finish))
        .route("/api/sessions/{id}/evaluate", post(evaluate_session))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
