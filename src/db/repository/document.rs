use std::str::FromStr;

use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::DocumentStatus;
use crate::models::Document;

const DOCUMENT_COLUMNS: &str =
    "id, user_id, filename, file_type, status, extracted_data, summary, created_at";

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, user_id, filename, file_type, status, extracted_data, summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doc.id.to_string(),
            doc.user_id.to_string(),
            doc.filename,
            doc.file_type,
            doc.status.as_str(),
            Value::Object(doc.extracted_data.clone()).to_string(),
            doc.summary,
            format_timestamp(&doc.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], row_to_document_row);

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All documents for a user, newest first. This is the default ordering everywhere
/// documents are listed.
pub fn fetch_documents(conn: &Connection, user_id: &Uuid) -> Result<Vec<Document>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt.query_map(params![user_id.to_string()], row_to_document_row)?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row?)?);
    }
    Ok(docs)
}

/// Update only the status of a document, enforcing the lifecycle machine:
/// uploaded → processing → ready, failed from any non-terminal state.
pub fn update_document_status(
    conn: &Connection,
    document_id: &Uuid,
    status: &DocumentStatus,
) -> Result<(), DatabaseError> {
    let current = get_document(conn, document_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Document".into(),
        id: document_id.to_string(),
    })?;

    if !current.status.can_transition(status) {
        return Err(DatabaseError::InvalidTransition {
            from: current.status.as_str().into(),
            to: status.as_str().into(),
        });
    }

    conn.execute(
        "UPDATE documents SET status = ?2 WHERE id = ?1",
        params![document_id.to_string(), status.as_str()],
    )?;
    Ok(())
}

/// Replace the extracted field map (and summary) after a re-run of analysis.
pub fn update_document_extraction(
    conn: &Connection,
    document_id: &Uuid,
    extracted_data: &Map<String, Value>,
    summary: Option<&str>,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET extracted_data = ?2, summary = ?3 WHERE id = ?1",
        params![
            document_id.to_string(),
            Value::Object(extracted_data.clone()).to_string(),
            summary,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: document_id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_document(conn: &Connection, document_id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM documents WHERE id = ?1",
        params![document_id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: document_id.to_string(),
        });
    }
    tracing::info!(document_id = %document_id, "Document deleted");
    Ok(())
}

// Internal row type for Document mapping
struct DocumentRow {
    id: String,
    user_id: String,
    filename: String,
    file_type: String,
    status: String,
    extracted_data: String,
    summary: Option<String>,
    created_at: String,
}

fn row_to_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        file_type: row.get(3)?,
        status: row.get(4)?,
        extracted_data: row.get(5)?,
        summary: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    let extracted_data: Map<String, Value> = serde_json::from_str(&row.extracted_data)
        .map_err(|e| DatabaseError::Corrupted(format!("extracted_data: {e}")))?;

    Ok(Document {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::Corrupted(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id)
            .map_err(|e| DatabaseError::Corrupted(e.to_string()))?,
        filename: row.filename,
        file_type: row.file_type,
        status: DocumentStatus::from_str(&row.status)?,
        extracted_data,
        summary: row.summary,
        created_at: parse_timestamp(&row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};

    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample_document(user_id: Uuid, filename: &str) -> Document {
        let mut data = Map::new();
        data.insert("vendor".into(), Value::String("Acme Corp".into()));
        data.insert("total_amount".into(), Value::String("$500.00".into()));
        Document {
            id: Uuid::new_v4(),
            user_id,
            filename: filename.into(),
            file_type: "pdf".into(),
            status: DocumentStatus::Ready,
            extracted_data: data,
            summary: Some("Invoice from Acme Corp.".into()),
            created_at: Local::now().naive_local(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document(Uuid::new_v4(), "invoice.pdf");
        insert_document(&conn, &doc).unwrap();

        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.filename, "invoice.pdf");
        assert_eq!(loaded.status, DocumentStatus::Ready);
        assert_eq!(loaded.field("vendor"), Some("Acme Corp"));
        assert_eq!(loaded.summary.as_deref(), Some("Invoice from Acme Corp."));
    }

    #[test]
    fn fetch_orders_newest_first() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();

        let mut older = sample_document(user, "older.pdf");
        older.created_at -= Duration::seconds(60);
        let newer = sample_document(user, "newer.pdf");
        insert_document(&conn, &older).unwrap();
        insert_document(&conn, &newer).unwrap();

        let docs = fetch_documents(&conn, &user).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].filename, "newer.pdf");
        assert_eq!(docs[1].filename, "older.pdf");
    }

    #[test]
    fn fetch_is_scoped_to_user() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        insert_document(&conn, &sample_document(user, "mine.pdf")).unwrap();
        insert_document(&conn, &sample_document(Uuid::new_v4(), "theirs.pdf")).unwrap();

        let docs = fetch_documents(&conn, &user).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "mine.pdf");
    }

    #[test]
    fn status_update_follows_machine() {
        let conn = open_memory_database().unwrap();
        let mut doc = sample_document(Uuid::new_v4(), "pending.pdf");
        doc.status = DocumentStatus::Uploaded;
        insert_document(&conn, &doc).unwrap();

        update_document_status(&conn, &doc.id, &DocumentStatus::Processing).unwrap();
        update_document_status(&conn, &doc.id, &DocumentStatus::Ready).unwrap();

        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.status, DocumentStatus::Ready);
    }

    #[test]
    fn illegal_transition_rejected() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document(Uuid::new_v4(), "done.pdf");
        insert_document(&conn, &doc).unwrap();

        let err = update_document_status(&conn, &doc.id, &DocumentStatus::Uploaded).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidTransition { .. }));

        // Row unchanged
        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.status, DocumentStatus::Ready);
    }

    #[test]
    fn status_update_missing_document() {
        let conn = open_memory_database().unwrap();
        let err =
            update_document_status(&conn, &Uuid::new_v4(), &DocumentStatus::Ready).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn extraction_update_replaces_fields() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document(Uuid::new_v4(), "invoice.pdf");
        insert_document(&conn, &doc).unwrap();

        let mut fields = Map::new();
        fields.insert("vendor".into(), Value::String("Globex".into()));
        update_document_extraction(&conn, &doc.id, &fields, Some("Updated.")).unwrap();

        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.field("vendor"), Some("Globex"));
        assert_eq!(loaded.field("total_amount"), None);
        assert_eq!(loaded.summary.as_deref(), Some("Updated."));
    }

    #[test]
    fn delete_removes_row() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document(Uuid::new_v4(), "gone.pdf");
        insert_document(&conn, &doc).unwrap();

        delete_document(&conn, &doc.id).unwrap();
        assert!(get_document(&conn, &doc.id).unwrap().is_none());

        let err = delete_document(&conn, &doc.id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
