//! Chat over the selected documents.
//!
//! Each exchange is grounded in a context string built from the selection at
//! send time, and both sides of the exchange are persisted with that
//! selection's document ids.

use rusqlite::Connection;
use uuid::Uuid;

use crate::agents::AgentGateway;
use crate::auth::Session;
use crate::db::repository::{fetch_chat_messages, insert_chat_message};
use crate::models::{ChatMessage, Document, MessageRole};

use super::{ChatError, SelectionStore};

/// Stored verbatim as the assistant reply when the chat agent is down.
pub const CHAT_OFFLINE_PLACEHOLDER: &str = "Failed to connect to the document agent.";

/// One block per document in selection order, separated by blank lines.
/// Extracted data is pretty-printed so the agent sees field names intact.
pub fn build_chat_context(documents: &[Document]) -> String {
    let blocks: Vec<String> = documents
        .iter()
        .map(|doc| {
            let data = serde_json::to_string_pretty(&doc.extracted_data)
                .unwrap_or_else(|_| "{}".to_string());
            let mut block = format!("Document: {}\nExtracted Data: {}\n", doc.filename, data);
            if let Some(text) = doc.full_text() {
                block.push_str(&format!("Full Text: {text}\n"));
            }
            block
        })
        .collect();
    blocks.join("\n\n")
}

pub struct ChatSession<'a, G: AgentGateway> {
    gateway: &'a G,
    conn: &'a Connection,
}

impl<'a, G: AgentGateway> ChatSession<'a, G> {
    pub fn new(gateway: &'a G, conn: &'a Connection) -> Self {
        Self { gateway, conn }
    }

    /// Sends one user message and returns the persisted assistant reply.
    ///
    /// The user message is persisted before the agent call; if that write
    /// fails nothing reaches the agent. An unreachable agent still produces
    /// a persisted assistant turn, carrying the offline placeholder.
    pub fn send(
        &self,
        session: &Session,
        store: &SelectionStore,
        message: &str,
    ) -> Result<ChatMessage, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let document_ids = store.selected_ids();

        let user_msg = ChatMessage {
            id: Uuid::new_v4(),
            user_id: session.user_id(),
            role: MessageRole::User,
            content: message.to_string(),
            document_ids: document_ids.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        insert_chat_message(self.conn, &user_msg)?;

        let context = build_chat_context(&store.selected_documents());
        let reply = match self.gateway.chat(message, &context) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Chat agent unavailable");
                CHAT_OFFLINE_PLACEHOLDER.to_string()
            }
        };

        let assistant_msg = ChatMessage {
            id: Uuid::new_v4(),
            user_id: session.user_id(),
            role: MessageRole::Assistant,
            content: reply,
            document_ids,
            created_at: chrono::Utc::now().naive_utc(),
        };
        insert_chat_message(self.conn, &assistant_msg)?;

        Ok(assistant_msg)
    }

    /// Full transcript, oldest first.
    pub fn history(&self, session: &Session) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(fetch_chat_messages(self.conn, &session.user_id())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::MockAgentGateway;
    use crate::db::sqlite::open_memory_database;
    use crate::models::DocumentStatus;

    fn session() -> Session {
        Session::authenticate(Some(Uuid::new_v4())).unwrap()
    }

    fn doc(filename: &str, vendor: &str) -> Document {
        let mut extracted = serde_json::Map::new();
        extracted.insert("vendor".into(), vendor.into());
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            filename: filename.to_string(),
            file_type: "pdf".to_string(),
            status: DocumentStatus::Ready,
            extracted_data: extracted,
            summary: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn store_with(documents: Vec<Document>) -> SelectionStore {
        let mut store = SelectionStore::new();
        store.set_documents(documents);
        store.select_all();
        store
    }

    #[test]
    fn send_persists_user_then_assistant_with_same_ids() {
        let conn = open_memory_database().unwrap();
        let mock = MockAgentGateway::new().with_chat("Acme Corp appears twice.");
        let chat = ChatSession::new(&mock, &conn);
        let session = session();
        let store = store_with(vec![doc("a.pdf", "Acme"), doc("b.pdf", "Acme")]);

        let reply = chat.send(&session, &store, "Who is the vendor?").unwrap();
        assert_eq!(reply.content, "Acme Corp appears twice.");

        let history = chat.history(&session).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "Who is the vendor?");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[0].document_ids, history[1].document_ids);
        assert_eq!(history[0].document_ids.len(), 2);
    }

    #[test]
    fn unreachable_agent_persists_offline_placeholder() {
        let conn = open_memory_database().unwrap();
        let mock = MockAgentGateway::new().failing_chat();
        let chat = ChatSession::new(&mock, &conn);
        let session = session();
        let store = store_with(vec![doc("a.pdf", "Acme")]);

        let reply = chat.send(&session, &store, "hello").unwrap();
        assert_eq!(reply.content, CHAT_OFFLINE_PLACEHOLDER);

        let history = chat.history(&session).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, CHAT_OFFLINE_PLACEHOLDER);
    }

    #[test]
    fn empty_message_rejected_without_agent_call() {
        let conn = open_memory_database().unwrap();
        let mock = MockAgentGateway::new();
        let chat = ChatSession::new(&mock, &conn);

        let err = chat
            .send(&session(), &SelectionStore::new(), "   ")
            .unwrap_err();

        assert!(matches!(err, ChatError::EmptyMessage));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn failed_user_insert_never_reaches_the_agent() {
        // A connection with no schema makes the first insert fail.
        let conn = Connection::open_in_memory().unwrap();
        let mock = MockAgentGateway::new();
        let chat = ChatSession::new(&mock, &conn);
        let store = store_with(vec![doc("a.pdf", "Acme")]);

        let result = chat.send(&session(), &store, "hello");

        assert!(result.is_err());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn context_blocks_follow_selection_order() {
        let a = doc("first.pdf", "Acme");
        let b = doc("second.pdf", "Globex");
        let context = build_chat_context(&[a, b]);

        let first = context.find("Document: first.pdf").unwrap();
        let second = context.find("Document: second.pdf").unwrap();
        assert!(first < second);
        assert!(context.contains("Extracted Data:"));
        assert!(context.contains("\"vendor\": \"Acme\""));
    }

    #[test]
    fn context_includes_full_text_only_when_present() {
        let mut with_text = doc("a.pdf", "Acme");
        with_text
            .extracted_data
            .insert("full_text".into(), "Invoice #1001".into());
        let without_text = doc("b.pdf", "Globex");

        let context = build_chat_context(&[with_text, without_text]);
        assert_eq!(context.matches("Full Text:").count(), 1);
    }
}
