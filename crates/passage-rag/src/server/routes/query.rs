//! Query route: retrieve, compose, answer with citations

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::conversation::ConversationTurn;
use crate::types::query::QueryRequest;
use crate::types::response::{Citation, QueryResponse};

/// `POST /api/sessions/:id/query`
///
/// The full query path: retrieve the most similar segments, build the
/// grounded prompt, generate, and record the exchange. A query that finds
/// no segments above the threshold is a successful response with no
/// citations; only a session with nothing ingested at all is an error.
pub async fn query_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::Config("question must not be empty".to_string()));
    }

    let session = state.sessions.get(id)?;
    let _guard = session.begin_query().await?;
    let start = Instant::now();

    let top_k = request.top_k.unwrap_or(state.config.retrieval.top_k);
    let threshold = request
        .similarity_threshold
        .unwrap_or(state.config.retrieval.similarity_threshold);

    let retrieved = state
        .retriever
        .retrieve(&session, &request.question, top_k, threshold)
        .await?;

    if retrieved.is_empty() {
        return Ok(Json(QueryResponse::no_relevant_results(
            start.elapsed().as_millis() as u64,
        )));
    }

    let history = session.history();
    let answer = state
        .composer
        .compose(&request.question, &retrieved, &history)
        .await?;

    let citations: Vec<Citation> = retrieved.iter().map(Citation::from_retrieved).collect();

    session.append_exchange(
        ConversationTurn::user(request.question),
        ConversationTurn::assistant(answer.text.clone(), answer.cited_segments),
    );
    if let Err(e) = state.sessions.persist_history(&session) {
        // persistence is best-effort; the in-memory history stays authoritative
        tracing::warn!(session = %id, error = %e, "failed to persist history");
    }

    Ok(Json(QueryResponse::new(
        answer.text,
        citations,
        start.elapsed().as_millis() as u64,
    )))
}
