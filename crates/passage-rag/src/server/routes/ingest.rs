//! Document upload and management routes

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::IngestFile;
use crate::server::state::AppState;
use crate::types::response::{DocumentSummary, IngestReport};

/// `POST /api/sessions/:id/documents`
///
/// Multipart upload of one or more text files. Per-file failures land in
/// the report; the response is 200 even for partial success so the client
/// can see exactly which files made it in.
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>> {
    let session = state.sessions.get(id)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Document(format!("malformed multipart upload: {e}")))?
    {
        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue, // non-file form fields are ignored
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Document(format!("failed to read upload {filename}: {e}")))?;
        files.push(IngestFile {
            filename,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(Error::Document("upload contains no files".to_string()));
    }

    let _guard = session.begin_ingest().await?;
    let report = state.ingest.ingest_batch(&session, files).await;
    Ok(Json(report))
}

/// `GET /api/sessions/:id/documents`
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentSummary>>> {
    let session = state.sessions.get(id)?;
    let summaries = session
        .documents()
        .iter()
        .map(DocumentSummary::from)
        .collect();
    Ok(Json(summaries))
}

/// `DELETE /api/sessions/:id/documents/:doc_id`
pub async fn remove_document(
    State(state): State<Arc<AppState>>,
    Path((id, doc_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let session = state.sessions.get(id)?;
    let _guard = session.begin_ingest().await?;
    session.remove_document(&doc_id)?;
    Ok(StatusCode::NO_CONTENT)
}
