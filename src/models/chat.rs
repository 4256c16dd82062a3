use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MessageRole;

/// One chat turn, user or assistant.
///
/// `document_ids` is the selection snapshot at send time, immutable once
/// written, so history review can reconstruct which documents informed which
/// answer. Messages are never mutated or deleted; replay order is strict
/// ascending `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub document_ids: Vec<Uuid>,
    pub created_at: NaiveDateTime,
}
