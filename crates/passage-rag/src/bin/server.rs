//! passage-server: session-scoped RAG over HTTP
//!
//! Configuration is read from the TOML file named by `PASSAGE_CONFIG`, or
//! defaults targeting a local Ollama instance when the variable is unset.

use passage_rag::config::RagConfig;
use passage_rag::server::{AppState, RagServer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("passage_rag=info,passage_core=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("PASSAGE_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "loading configuration");
            RagConfig::from_toml_file(&path)?
        }
        Err(_) => RagConfig::default(),
    };

    let state = AppState::from_config(config)?;

    tracing::info!(
        embedding_provider = state.embedder.name(),
        dimensions = state.embedder.dimensions(),
        generation_model = state.llm.model(),
        "starting passage server"
    );

    if !state.embedder.health_check().await.unwrap_or(false) {
        tracing::warn!(
            base_url = %state.config.llm.base_url,
            "embedding backend unreachable; ingestion will fail until it is up \
             (is Ollama running? try `ollama pull {}`)",
            state.config.llm.embed_model
        );
    }
    if !state.llm.health_check().await.unwrap_or(false) {
        tracing::warn!(
            base_url = %state.config.llm.base_url,
            "generation backend unreachable; queries will fail until it is up \
             (try `ollama pull {}`)",
            state.config.llm.generate_model
        );
    }

    RagServer::new(state).serve().await?;
    Ok(())
}
