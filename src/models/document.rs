use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// A user-uploaded file plus its analysis results and lifecycle status.
///
/// `extracted_data` is the free-form key/value map the agents produced;
/// there is no fixed schema, so every consumer must treat every field as
/// optional. A Document only becomes visible to selection/chat/analytics
/// once it has been persisted by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub status: DocumentStatus,
    pub extracted_data: Map<String, Value>,
    pub summary: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Document {
    /// Extracted field as a string, if present and textual.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.extracted_data.get(key).and_then(Value::as_str)
    }

    /// The document's full text, under either key the agents use for it.
    pub fn full_text(&self) -> Option<&str> {
        self.field("full_text")
            .or_else(|| self.field("text"))
            .filter(|t| !t.is_empty())
    }
}
