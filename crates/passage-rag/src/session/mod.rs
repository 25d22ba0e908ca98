//! Sessions: isolated conversation scopes
//!
//! Each session exclusively owns its vector index, document registry, and
//! conversation history; nothing is shared across sessions. Within a session
//! a single operation (ingest or query) runs at a time, serialized by an
//! async mutex; different sessions run concurrently without restriction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use passage_core::{CoreError, IndexEntry, IndexOptions, VectorIndex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::HistoryStore;
use crate::types::conversation::ConversationTurn;
use crate::types::document::{Document, Segment};
use crate::types::response::SessionSummary;

/// Session lifecycle.
///
/// `Created -> Ingesting -> Ready <-> Querying`, with `Closed` terminal.
/// Ingestion and querying are mutually exclusive per session; the operation
/// guard returns the session to `Ready` (or `Created` while no documents
/// are ingested) when the operation ends, including on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Ingesting,
    Ready,
    Querying,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Ingesting => "ingesting",
            Self::Ready => "ready",
            Self::Querying => "querying",
            Self::Closed => "closed",
        }
    }
}

/// An isolated conversation scope with its own index and history
pub struct Session {
    id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    index: VectorIndex,
    documents: RwLock<HashMap<Uuid, Document>>,
    content_hashes: RwLock<HashSet<String>>,
    segments: DashMap<Uuid, Segment>,
    document_segments: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    history: RwLock<Vec<ConversationTurn>>,
    state: RwLock<SessionState>,
    op_lock: tokio::sync::Mutex<()>,
}

impl Session {
    pub fn new(index_options: IndexOptions) -> Result<Self> {
        let index = VectorIndex::new(index_options)?;
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            index,
            documents: RwLock::new(HashMap::new()),
            content_hashes: RwLock::new(HashSet::new()),
            segments: DashMap::new(),
            document_segments: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
            state: RwLock::new(SessionState::Created),
            op_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            state: self.state().as_str().to_string(),
            document_count: self.documents.read().len(),
            turn_count: self.history.read().len(),
            created_at: self.created_at,
        }
    }

    /// Begin an ingestion operation. Waits for any in-flight operation on
    /// this session to finish.
    pub async fn begin_ingest(&self) -> Result<OperationGuard<'_>> {
        let permit = self.op_lock.lock().await;
        self.enter(SessionState::Ingesting)?;
        Ok(OperationGuard {
            session: self,
            _permit: permit,
        })
    }

    /// Begin a query operation. Fails with `EmptyIndex` when the session has
    /// no ingested documents, as a condition distinct from "no results".
    pub async fn begin_query(&self) -> Result<OperationGuard<'_>> {
        let permit = self.op_lock.lock().await;
        if self.state() == SessionState::Closed {
            return Err(Error::SessionClosed(self.id));
        }
        if self.documents.read().is_empty() {
            return Err(Error::EmptyIndex);
        }
        self.enter(SessionState::Querying)?;
        Ok(OperationGuard {
            session: self,
            _permit: permit,
        })
    }

    fn enter(&self, next: SessionState) -> Result<()> {
        let mut state = self.state.write();
        if *state == SessionState::Closed {
            return Err(Error::SessionClosed(self.id));
        }
        *state = next;
        Ok(())
    }

    /// Mark the session closed. Waits for any in-flight operation; the
    /// index and history are released when the last `Arc` drops.
    pub async fn close(&self) {
        let _permit = self.op_lock.lock().await;
        *self.state.write() = SessionState::Closed;
    }

    /// Register a fully embedded document. All-or-nothing per document: a
    /// dimensionality mismatch is rejected before any entry is inserted.
    pub fn insert_document(
        &self,
        mut document: Document,
        segments: Vec<Segment>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<()> {
        if segments.len() != embeddings.len() {
            return Err(Error::Internal(format!(
                "segment/embedding count mismatch: {} vs {}",
                segments.len(),
                embeddings.len()
            )));
        }
        let expected = self.index.dimensions();
        if let Some(bad) = embeddings.iter().find(|v| v.len() != expected) {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: bad.len(),
            }
            .into());
        }

        let mut segment_ids = Vec::with_capacity(segments.len());
        for (segment, vector) in segments.into_iter().zip(embeddings) {
            let entry = IndexEntry::new(segment.id, vector)
                .with_metadata(segment.to_index_metadata(&document.filename));
            self.index.insert(entry)?;
            segment_ids.push(segment.id);
            self.segments.insert(segment.id, segment);
        }

        document.segment_count = segment_ids.len() as u32;
        self.content_hashes.write().insert(document.content_hash.clone());
        self.document_segments.write().insert(document.id, segment_ids);
        self.documents.write().insert(document.id, document);
        Ok(())
    }

    /// Remove a document and all its index entries. The index remains
    /// queryable afterward.
    pub fn remove_document(&self, document_id: &Uuid) -> Result<usize> {
        let document = self
            .documents
            .write()
            .remove(document_id)
            .ok_or_else(|| Error::Document(format!("document {document_id} not in session")))?;

        let segment_ids = self
            .document_segments
            .write()
            .remove(document_id)
            .unwrap_or_default();

        let mut removed = 0;
        for segment_id in &segment_ids {
            if self.index.remove(segment_id) {
                removed += 1;
            }
            self.segments.remove(segment_id);
        }
        self.content_hashes.write().remove(&document.content_hash);

        tracing::info!(
            session = %self.id,
            document = %document_id,
            segments = removed,
            "removed document"
        );
        Ok(removed)
    }

    pub fn has_content_hash(&self, hash: &str) -> bool {
        self.content_hashes.read().contains(hash)
    }

    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }

    pub fn document(&self, id: &Uuid) -> Option<Document> {
        self.documents.read().get(id).cloned()
    }

    pub fn documents(&self) -> Vec<Document> {
        let mut docs: Vec<Document> = self.documents.read().values().cloned().collect();
        docs.sort_by_key(|d| d.ingested_at);
        docs
    }

    pub fn segment(&self, id: &Uuid) -> Option<Segment> {
        self.segments.get(id).map(|s| s.clone())
    }

    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.read().clone()
    }

    pub fn turn_count(&self) -> usize {
        self.history.read().len()
    }

    /// Append a completed user/assistant exchange atomically. Called only
    /// after generation succeeded; a failed query appends nothing.
    pub fn append_exchange(&self, user: ConversationTurn, assistant: ConversationTurn) {
        let mut history = self.history.write();
        history.push(user);
        history.push(assistant);
    }
}

/// RAII guard for an in-flight session operation. Dropping it (on success,
/// failure, or cancellation) returns the session to `Ready`, or `Created`
/// while no documents are ingested, without ever resurrecting a closed
/// session.
pub struct OperationGuard<'a> {
    session: &'a Session,
    _permit: tokio::sync::MutexGuard<'a, ()>,
}

impl std::fmt::Debug for OperationGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationGuard").finish_non_exhaustive()
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state.write();
        if *state == SessionState::Closed {
            return;
        }
        *state = if self.session.documents.read().is_empty() {
            SessionState::Created
        } else {
            SessionState::Ready
        };
    }
}

/// Registry of live sessions
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<Session>>,
    index_options: IndexOptions,
    store: Option<HistoryStore>,
}

impl SessionManager {
    pub fn new(index_options: IndexOptions, store: Option<HistoryStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            index_options,
            store,
        }
    }

    pub fn create(&self) -> Result<Arc<Session>> {
        let session = Arc::new(Session::new(self.index_options.clone())?);
        tracing::info!(session = %session.id(), "created session");
        self.sessions.insert(session.id(), Arc::clone(&session));
        Ok(session)
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Session>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::SessionNotFound(id))
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// Close and remove a session, releasing its index and history
    pub async fn close(&self, id: Uuid) -> Result<()> {
        let (_, session) = self
            .sessions
            .remove(&id)
            .ok_or(Error::SessionNotFound(id))?;
        session.close().await;
        if let Some(store) = &self.store {
            store.remove(id)?;
        }
        tracing::info!(session = %id, "closed session");
        Ok(())
    }

    /// Write a session's history through the optional persistence layer
    pub fn persist_history(&self, session: &Session) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(session.id(), &session.history())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(IndexOptions::new(4)).unwrap()
    }

    fn document_with_segments(session: &Session) {
        let doc = Document::new("a.txt".into(), "hash-a".into(), 4);
        let segment = Segment::new(doc.id, "text".into(), 0, 4, 0);
        session
            .insert_document(doc, vec![segment], vec![vec![1.0, 0.0, 0.0, 0.0]])
            .unwrap();
    }

    #[tokio::test]
    async fn query_on_empty_session_is_empty_index_error() {
        let s = session();
        let err = s.begin_query().await.unwrap_err();
        assert!(matches!(err, Error::EmptyIndex));
        assert_eq!(s.state(), SessionState::Created);
    }

    #[tokio::test]
    async fn guard_restores_ready_after_ingest() {
        let s = session();
        {
            let _guard = s.begin_ingest().await.unwrap();
            assert_eq!(s.state(), SessionState::Ingesting);
            document_with_segments(&s);
        }
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn guard_restores_created_when_ingest_produced_nothing() {
        let s = session();
        {
            let _guard = s.begin_ingest().await.unwrap();
        }
        assert_eq!(s.state(), SessionState::Created);
    }

    #[tokio::test]
    async fn closed_session_rejects_operations() {
        let s = session();
        s.close().await;
        assert!(matches!(
            s.begin_ingest().await.unwrap_err(),
            Error::SessionClosed(_)
        ));
        assert!(matches!(
            s.begin_query().await.unwrap_err(),
            Error::SessionClosed(_)
        ));
    }

    #[tokio::test]
    async fn mismatched_embedding_rejects_whole_document() {
        let s = session();
        let doc = Document::new("a.txt".into(), "hash-a".into(), 8);
        let seg_ok = Segment::new(doc.id, "good".into(), 0, 4, 0);
        let seg_bad = Segment::new(doc.id, "bad".into(), 4, 8, 1);
        let err = s
            .insert_document(
                doc,
                vec![seg_ok, seg_bad],
                vec![vec![1.0, 0.0, 0.0, 0.0], vec![1.0, 0.0]],
            )
            .unwrap_err();
        assert_eq!(err.kind(), "dimension_mismatch");
        assert_eq!(s.index().len(), 0);
        assert_eq!(s.document_count(), 0);
    }

    #[tokio::test]
    async fn remove_document_clears_index_entries() {
        let s = session();
        document_with_segments(&s);
        let doc_id = s.documents()[0].id;
        assert_eq!(s.remove_document(&doc_id).unwrap(), 1);
        assert_eq!(s.index().len(), 0);
        assert_eq!(s.document_count(), 0);
        assert!(!s.has_content_hash("hash-a"));
    }

    #[tokio::test]
    async fn failed_exchange_leaves_history_untouched() {
        let s = session();
        document_with_segments(&s);
        assert_eq!(s.turn_count(), 0);
        s.append_exchange(
            ConversationTurn::user("q"),
            ConversationTurn::assistant("a", vec![]),
        );
        assert_eq!(s.turn_count(), 2);
    }
}
