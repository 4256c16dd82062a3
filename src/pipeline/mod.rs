//! Document ingestion pipeline: upload, two-stage agent analysis, field
//! normalization, and the single persistence write that makes a document
//! visible.

pub mod fields;
pub mod ingest;

pub use fields::resolve_fields;
pub use ingest::{DocumentIngestor, FileUpload};

use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Upload has an empty filename")]
    EmptyFilename,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Document {0} is not pending analysis")]
    NotPending(Uuid),
}
