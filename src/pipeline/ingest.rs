use std::path::Path;

use rusqlite::Connection;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agents::{AgentGateway, IngestResponse};
use crate::auth::Session;
use crate::db::repository::{
    delete_document, get_document, insert_document, update_document_extraction,
    update_document_status,
};
use crate::models::{Document, DocumentStatus};
use crate::selection::SelectionStore;

use super::fields::resolve_fields;
use super::IngestError;

/// A file handed to the pipeline, already read into memory.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            bytes,
        }
    }

    /// Lowercased extension, or "unknown" when the filename has none.
    pub fn file_type(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Runs uploads through the two agent stages and persists the result.
///
/// A document reaches the database exactly once per upload, in its final
/// state: partial agent results degrade the content, never the write.
pub struct DocumentIngestor<'a, G: AgentGateway> {
    gateway: &'a G,
    conn: &'a Connection,
}

impl<'a, G: AgentGateway> DocumentIngestor<'a, G> {
    pub fn new(gateway: &'a G, conn: &'a Connection) -> Self {
        Self { gateway, conn }
    }

    /// Ingests one upload and returns the persisted document.
    ///
    /// When the agent service is unreachable the document is stored with
    /// fallback content and status `uploaded`, eligible for [`Self::reprocess`]
    /// once the service is back.
    pub fn ingest(&self, session: &Session, upload: &FileUpload) -> Result<Document, IngestError> {
        if upload.filename.trim().is_empty() {
            return Err(IngestError::EmptyFilename);
        }

        let (analysis, ingest_ok) = match self.gateway.ingest(&upload.filename, &upload.bytes) {
            Ok(response) => (response, true),
            Err(e) => {
                tracing::warn!(
                    filename = %upload.filename,
                    error = %e,
                    "Ingest agent unavailable, storing document with fallback content"
                );
                (IngestResponse::fallback(), false)
            }
        };

        let extracted = self.run_extraction(&upload.filename, &analysis);

        let status = if ingest_ok {
            DocumentStatus::Ready
        } else {
            DocumentStatus::Uploaded
        };

        let document = Document {
            id: Uuid::new_v4(),
            user_id: session.user_id(),
            filename: upload.filename.clone(),
            file_type: upload.file_type(),
            status,
            extracted_data: extracted,
            summary: Some(analysis.summary.clone()),
            created_at: chrono::Utc::now().naive_utc(),
        };

        insert_document(self.conn, &document)?;
        tracing::info!(
            document_id = %document.id,
            filename = %document.filename,
            status = document.status.as_str(),
            "Document ingested"
        );
        Ok(document)
    }

    /// Re-runs analysis on a document stuck in `uploaded`.
    ///
    /// The agent is probed before the status flips to `processing`, so a
    /// still-unavailable service leaves the row untouched. Once processing
    /// has begun the document always lands in `ready` or `failed`.
    pub fn reprocess(
        &self,
        session: &Session,
        document_id: &Uuid,
        upload: &FileUpload,
    ) -> Result<Document, IngestError> {
        let document = get_document(self.conn, document_id)?
            .filter(|d| d.user_id == session.user_id())
            .ok_or(IngestError::NotFound(*document_id))?;

        if document.status != DocumentStatus::Uploaded {
            return Err(IngestError::NotPending(*document_id));
        }

        let analysis = match self.gateway.ingest(&upload.filename, &upload.bytes) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    document_id = %document_id,
                    error = %e,
                    "Ingest agent still unavailable, document remains pending"
                );
                return Ok(document);
            }
        };

        update_document_status(self.conn, document_id, &DocumentStatus::Processing)?;

        let extracted = self.run_extraction(&upload.filename, &analysis);

        let finish = update_document_extraction(
            self.conn,
            document_id,
            &extracted,
            Some(&analysis.summary),
        )
        .and_then(|_| update_document_status(self.conn, document_id, &DocumentStatus::Ready));

        if let Err(e) = finish {
            // The row must not stay in processing forever.
            if let Err(mark) =
                update_document_status(self.conn, document_id, &DocumentStatus::Failed)
            {
                tracing::error!(
                    document_id = %document_id,
                    error = %mark,
                    "Failed to mark document as failed"
                );
            }
            return Err(e.into());
        }

        let updated = get_document(self.conn, document_id)?
            .ok_or(IngestError::NotFound(*document_id))?;
        tracing::info!(document_id = %document_id, "Document reprocessed");
        Ok(updated)
    }

    /// Deletes a document and drops it from the selection in the same call,
    /// so no dangling selected id survives.
    pub fn delete(
        &self,
        store: &mut SelectionStore,
        document_id: &Uuid,
    ) -> Result<(), IngestError> {
        delete_document(self.conn, document_id)?;
        store.remove_document(document_id);
        Ok(())
    }

    fn run_extraction(&self, filename: &str, analysis: &IngestResponse) -> Map<String, Value> {
        // No text means nothing to extract from; sentinels fill the
        // canonical fields without an agent round trip.
        let raw = if analysis.full_text.trim().is_empty() {
            Map::new()
        } else {
            match self.gateway.extract(&analysis.full_text, &analysis.doc_type) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!(
                        filename = %filename,
                        error = %e,
                        "Extraction agent unavailable, storing canonical sentinels"
                    );
                    Map::new()
                }
            }
        };
        let mut resolved = resolve_fields(&raw);
        resolved.insert(
            "detected_type".into(),
            Value::String(analysis.doc_type.clone()),
        );
        resolved.insert("confidence".into(), analysis.confidence.into());
        if !analysis.full_text.is_empty() {
            resolved.insert(
                "full_text".into(),
                Value::String(analysis.full_text.clone()),
            );
        }
        if !analysis.thumbnail_url.is_empty() {
            resolved.insert(
                "thumbnail_url".into(),
                Value::String(analysis.thumbnail_url.clone()),
            );
        }
        resolved
    }
}
