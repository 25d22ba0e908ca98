//! HTTP server wiring

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};

pub use state::AppState;

/// The RAG HTTP server
pub struct RagServer {
    state: Arc<AppState>,
}

impl RagServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the full router with middleware. Exposed separately from
    /// `serve` so tests can drive it with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .nest("/api", routes::api_router())
            .layer(DefaultBodyLimit::max(self.state.config.server.max_upload_size))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Bind and serve until the process is stopped
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = format!(
            "{}:{}",
            self.state.config.server.host, self.state.config.server.port
        )
        .parse()
        .map_err(|e| Error::Config(format!("invalid server address: {e}")))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "listening");

        let router = self.router();
        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("server error: {e}")))?;
        Ok(())
    }
}

/// `GET /health`: liveness plus backend reachability
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let embeddings_ok = state.embedder.health_check().await.unwrap_or(false);
    let generation_ok = state.llm.health_check().await.unwrap_or(false);
    Json(serde_json::json!({
        "status": "ok",
        "embedding_backend": {
            "provider": state.embedder.name(),
            "dimensions": state.embedder.dimensions(),
            "reachable": embeddings_ok,
        },
        "generation_backend": {
            "provider": state.llm.name(),
            "model": state.llm.model(),
            "reachable": generation_ok,
        },
        "sessions": state.sessions.list().len(),
    }))
}
