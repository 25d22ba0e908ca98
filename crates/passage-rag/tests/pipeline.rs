//! End-to-end pipeline tests over deterministic mock providers

use std::sync::Arc;
use std::time::Duration;

use passage_rag::config::{ChunkingConfig, LlmConfig};
use passage_rag::generation::AnswerComposer;
use passage_rag::ingestion::{Chunker, IngestFile, IngestPipeline};
use passage_rag::providers::mock::{MockEmbedder, MockGenerator};
use passage_rag::providers::{EmbeddingProvider, GenerationProvider};
use passage_rag::retrieval::Retriever;
use passage_rag::session::{Session, SessionState};
use passage_rag::types::conversation::ConversationTurn;
use passage_rag::Error;
use passage_core::IndexOptions;

const POLICY: &str = "Vacation days: 20 per year. Sick days: 10 per year.";

fn pipeline(embedder: Arc<MockEmbedder>) -> IngestPipeline {
    IngestPipeline::new(Chunker::new(ChunkingConfig::new(50, 10)).unwrap(), embedder)
}

fn file(name: &str, content: &str) -> IngestFile {
    IngestFile {
        filename: name.to_string(),
        data: content.as_bytes().to_vec(),
    }
}

fn llm_config() -> LlmConfig {
    LlmConfig {
        max_attempts: 3,
        backoff_ms: 1,
        ..LlmConfig::default()
    }
}

async fn new_session(embedder: &MockEmbedder) -> Session {
    Session::new(IndexOptions::new(embedder.dimensions())).unwrap()
}

#[tokio::test]
async fn ingest_query_answer_with_citations() {
    let embedder = Arc::new(MockEmbedder::new(64));
    let session = new_session(&embedder).await;
    let pipeline = pipeline(Arc::clone(&embedder));

    {
        let _guard = session.begin_ingest().await.unwrap();
        let report = pipeline
            .ingest_batch(&session, vec![file("policy.txt", POLICY)])
            .await;
        assert!(report.is_complete_success());
        assert_eq!(report.documents.len(), 1);
        assert!(report.total_segments >= 2);
    }
    assert_eq!(session.state(), SessionState::Ready);

    let retriever = Retriever::new(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>);
    let question = "How many vacation days do employees get?";

    let _guard = session.begin_query().await.unwrap();
    let retrieved = retriever
        .retrieve(&session, question, 5, 0.25)
        .await
        .unwrap();

    // only the segment that mentions vacation clears the threshold
    assert_eq!(retrieved.len(), 1);
    assert_eq!(retrieved[0].segment.segment_index, 0);
    assert!(retrieved[0].segment.content.contains("Vacation days: 20"));
    assert_eq!(retrieved[0].filename, "policy.txt");

    let generator = Arc::new(MockGenerator::answering("Employees get 20 vacation days."));
    let composer = AnswerComposer::new(generator as _, &llm_config(), 8);
    let answer = composer
        .compose(question, &retrieved, &session.history())
        .await
        .unwrap();

    assert_eq!(answer.cited_segments, vec![retrieved[0].segment.id]);

    session.append_exchange(
        ConversationTurn::user(question),
        ConversationTurn::assistant(answer.text, answer.cited_segments),
    );
    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].cited_segments, vec![retrieved[0].segment.id]);
}

#[tokio::test]
async fn querying_an_empty_session_is_an_error_not_empty_results() {
    let embedder = Arc::new(MockEmbedder::new(32));
    let session = new_session(&embedder).await;

    let err = session.begin_query().await.unwrap_err();
    assert!(matches!(err, Error::EmptyIndex));

    // the retriever reports the same condition without calling the embedder
    let retriever = Retriever::new(embedder as _);
    let err = retriever
        .retrieve(&session, "anything", 5, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyIndex));
}

#[tokio::test]
async fn sessions_are_isolated() {
    let embedder = Arc::new(MockEmbedder::new(64));
    let pipeline = pipeline(Arc::clone(&embedder));

    let vacations = new_session(&embedder).await;
    let recipes = new_session(&embedder).await;

    let (a, b) = tokio::join!(
        async {
            let _guard = vacations.begin_ingest().await.unwrap();
            pipeline
                .ingest_batch(&vacations, vec![file("policy.txt", POLICY)])
                .await
        },
        async {
            let _guard = recipes.begin_ingest().await.unwrap();
            pipeline
                .ingest_batch(
                    &recipes,
                    vec![file(
                        "soup.txt",
                        "Tomato soup: simmer tomatoes with basil and garlic.",
                    )],
                )
                .await
        },
    );
    assert!(a.is_complete_success());
    assert!(b.is_complete_success());

    let retriever = Retriever::new(Arc::clone(&embedder) as _);

    let from_vacations = retriever
        .retrieve(&vacations, "vacation days", 5, 0.0)
        .await
        .unwrap();
    assert!(from_vacations.iter().all(|r| r.filename == "policy.txt"));

    let from_recipes = retriever
        .retrieve(&recipes, "tomato soup", 5, 0.0)
        .await
        .unwrap();
    assert!(from_recipes.iter().all(|r| r.filename == "soup.txt"));
}

#[tokio::test]
async fn duplicate_content_dedup_is_per_session() {
    let embedder = Arc::new(MockEmbedder::new(32));
    let pipeline = pipeline(Arc::clone(&embedder));

    let first = new_session(&embedder).await;
    let second = new_session(&embedder).await;

    let report = pipeline
        .ingest_batch(&first, vec![file("a.txt", POLICY)])
        .await;
    assert_eq!(report.documents.len(), 1);

    // same bytes into a different session must not be treated as duplicate
    let report = pipeline
        .ingest_batch(&second, vec![file("a.txt", POLICY)])
        .await;
    assert_eq!(report.documents.len(), 1);
    assert!(report.skipped.is_empty());

    // but within the first session they are
    let report = pipeline
        .ingest_batch(&first, vec![file("renamed.txt", POLICY)])
        .await;
    assert!(report.documents.is_empty());
    assert_eq!(report.skipped.len(), 1);
}

#[tokio::test]
async fn repeated_queries_are_deterministic() {
    let embedder = Arc::new(MockEmbedder::new(64));
    let session = new_session(&embedder).await;
    let pipeline = pipeline(Arc::clone(&embedder));
    pipeline
        .ingest_batch(&session, vec![file("policy.txt", POLICY)])
        .await;

    let retriever = Retriever::new(embedder as _);
    let first = retriever
        .retrieve(&session, "vacation days", 5, 0.0)
        .await
        .unwrap();
    let second = retriever
        .retrieve(&session, "vacation days", 5, 0.0)
        .await
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.segment.id, b.segment.id);
        assert_eq!(a.similarity, b.similarity);
    }
}

#[tokio::test]
async fn generation_exhaustion_leaves_history_untouched() {
    let embedder = Arc::new(MockEmbedder::new(64));
    let session = new_session(&embedder).await;
    let pipeline = pipeline(Arc::clone(&embedder));
    pipeline
        .ingest_batch(&session, vec![file("policy.txt", POLICY)])
        .await;

    let retriever = Retriever::new(Arc::clone(&embedder) as _);
    let retrieved = retriever
        .retrieve(&session, "vacation days", 5, 0.0)
        .await
        .unwrap();

    let generator = Arc::new(MockGenerator::failing_then(100, "never"));
    let composer = AnswerComposer::new(Arc::clone(&generator) as _, &llm_config(), 8);
    let err = composer
        .compose("vacation days", &retrieved, &session.history())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
    assert_eq!(generator.call_count(), 3);

    // the exchange is only recorded after a successful composition
    assert_eq!(session.turn_count(), 0);
}

#[tokio::test]
async fn aborted_in_flight_query_restores_session_state() {
    struct StallingGenerator;

    #[async_trait::async_trait]
    impl GenerationProvider for StallingGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _history: &[ConversationTurn],
        ) -> passage_rag::Result<String> {
            std::future::pending().await
        }
        async fn health_check(&self) -> passage_rag::Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "stalling"
        }
        fn model(&self) -> &str {
            "stalling"
        }
    }

    let embedder = Arc::new(MockEmbedder::new(64));
    let session = Arc::new(new_session(&embedder).await);
    pipeline(Arc::clone(&embedder))
        .ingest_batch(&session, vec![file("policy.txt", POLICY)])
        .await;

    let task = tokio::spawn({
        let session = Arc::clone(&session);
        let embedder = Arc::clone(&embedder);
        async move {
            let retriever = Retriever::new(embedder as _);
            let composer =
                AnswerComposer::new(Arc::new(StallingGenerator) as _, &llm_config(), 8);
            let _guard = session.begin_query().await.unwrap();
            let retrieved = retriever
                .retrieve(&session, "vacation days", 5, 0.0)
                .await
                .unwrap();
            let answer = composer
                .compose("vacation days", &retrieved, &session.history())
                .await
                .unwrap();
            session.append_exchange(
                ConversationTurn::user("vacation days"),
                ConversationTurn::assistant(answer.text, answer.cited_segments),
            );
        }
    });

    // wait until the query is actually in flight before pulling the plug
    for _ in 0..200 {
        if session.state() == SessionState::Querying {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(session.state(), SessionState::Querying);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    // the dropped future released its guard: state restored, no partial turn
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.turn_count(), 0);

    // and the session still accepts new operations
    let guard = session.begin_query().await.unwrap();
    drop(guard);
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn partial_batch_failure_keeps_good_documents_queryable() {
    let embedder = Arc::new(MockEmbedder::new(64));
    let session = new_session(&embedder).await;
    let pipeline = pipeline(Arc::clone(&embedder));

    let report = pipeline
        .ingest_batch(
            &session,
            vec![
                file("policy.txt", POLICY),
                IngestFile {
                    filename: "broken.bin".to_string(),
                    data: vec![0xff, 0xfe, 0x80],
                },
            ],
        )
        .await;
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, "document_rejected");

    let retriever = Retriever::new(embedder as _);
    let retrieved = retriever
        .retrieve(&session, "vacation days", 5, 0.0)
        .await
        .unwrap();
    assert!(!retrieved.is_empty());
}
