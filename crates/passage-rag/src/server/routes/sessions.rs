//! Session lifecycle routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::response::{HistoryResponse, SessionSummary};

/// `POST /api/sessions`
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionSummary>)> {
    let session = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(session.summary())))
}

/// `GET /api/sessions`
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<SessionSummary>> {
    Json(state.sessions.list())
}

/// `DELETE /api/sessions/:id`
///
/// Closing is terminal: the session's index, documents, and history are
/// released and later operations on the id fail with `session_not_found`.
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sessions/:id/history`
pub async fn session_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>> {
    let session = state.sessions.get(id)?;
    Ok(Json(HistoryResponse {
        session_id: id,
        turns: session.history(),
    }))
}
