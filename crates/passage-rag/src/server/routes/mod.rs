//! HTTP route handlers

pub mod ingest;
pub mod query;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use super::state::AppState;

/// The `/api` route tree
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/sessions",
            post(sessions::create_session).get(sessions::list_sessions),
        )
        .route("/sessions/:id", delete(sessions::close_session))
        .route("/sessions/:id/history", get(sessions::session_history))
        .route(
            "/sessions/:id/documents",
            post(ingest::upload_documents).get(ingest::list_documents),
        )
        .route(
            "/sessions/:id/documents/:doc_id",
            delete(ingest::remove_document),
        )
        .route("/sessions/:id/query", post(query::query_session))
}
