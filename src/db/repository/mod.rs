//! Repository layer: entity-scoped database operations.
//!
//! All rows belong to a user; timestamps are stored as fixed-width text so
//! lexicographic ORDER BY is chronological. `extracted_data` and
//! `document_ids` are JSON text columns, the shapes the orchestration core
//! relies on, nothing more.

mod chat_message;
mod document;

pub use chat_message::*;
pub use document::*;

use chrono::NaiveDateTime;

/// Fixed-width timestamp format; microsecond precision keeps rapid inserts
/// distinct for ordering purposes.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .unwrap_or_default()
}
