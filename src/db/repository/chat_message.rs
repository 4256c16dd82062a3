use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::MessageRole;
use crate::models::ChatMessage;

pub fn insert_chat_message(conn: &Connection, msg: &ChatMessage) -> Result<(), DatabaseError> {
    let document_ids: Vec<String> = msg.document_ids.iter().map(Uuid::to_string).collect();
    let document_ids_json = serde_json::to_string(&document_ids)
        .map_err(|e| DatabaseError::Corrupted(format!("document_ids: {e}")))?;

    conn.execute(
        "INSERT INTO chat_messages (id, user_id, role, content, document_ids, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            msg.id.to_string(),
            msg.user_id.to_string(),
            msg.role.as_str(),
            msg.content,
            document_ids_json,
            format_timestamp(&msg.created_at),
        ],
    )?;
    Ok(())
}

/// Chat history for a user in strict chronological (replay) order.
pub fn fetch_chat_messages(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, role, content, document_ids, created_at
         FROM chat_messages WHERE user_id = ?1
         ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            role: row.get(2)?,
            content: row.get(3)?,
            document_ids: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: String,
    user_id: String,
    role: String,
    content: String,
    document_ids: String,
    created_at: String,
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    let raw_ids: Vec<String> = serde_json::from_str(&row.document_ids)
        .map_err(|e| DatabaseError::Corrupted(format!("document_ids: {e}")))?;
    let mut document_ids = Vec::with_capacity(raw_ids.len());
    for raw in raw_ids {
        document_ids
            .push(Uuid::parse_str(&raw).map_err(|e| DatabaseError::Corrupted(e.to_string()))?);
    }

    Ok(ChatMessage {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::Corrupted(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id)
            .map_err(|e| DatabaseError::Corrupted(e.to_string()))?,
        role: MessageRole::from_str(&row.role)?,
        content: row.content,
        document_ids,
        created_at: parse_timestamp(&row.created_at),
    })
}
