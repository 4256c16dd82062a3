//! Client-side selection state and the features scoped by it.
//!
//! Chat and analytics both operate on "the currently selected documents";
//! this module owns that set and keeps every consumer working from the same
//! snapshot of it.

pub mod analytics;
pub mod chat;

pub use analytics::{AnalyticsState, AnalyticsView};
pub use chat::ChatSession;

use std::collections::HashSet;

use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Document;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Message is empty")]
    EmptyMessage,
}

/// Order-independent identity of a selection, used to match async results
/// to the selection they were computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot(Vec<Uuid>);

impl SelectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Payload pushed to subscribers on every selection change.
#[derive(Debug, Clone)]
pub struct SelectionChange {
    pub selected: usize,
    pub total: usize,
    pub snapshot: SelectionSnapshot,
}

/// The document list and its selected subset.
///
/// Document order is most-recent-first, matching the repository's fetch
/// order. Selection ops on unknown ids are no-ops, never errors.
#[derive(Default)]
pub struct SelectionStore {
    documents: Vec<Document>,
    selected: HashSet<Uuid>,
    subscribers: Vec<Box<dyn Fn(&SelectionChange)>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the document list, dropping selected ids that no longer
    /// resolve.
    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        let known: HashSet<Uuid> = self.documents.iter().map(|d| d.id).collect();
        self.selected.retain(|id| known.contains(id));
        self.notify();
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Flips membership for a known document id and returns the new
    /// membership. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &Uuid) -> bool {
        if !self.documents.iter().any(|d| d.id == *id) {
            return false;
        }
        let now_selected = if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(*id);
            true
        };
        self.notify();
        now_selected
    }

    pub fn select_all(&mut self) {
        self.selected = self.documents.iter().map(|d| d.id).collect();
        self.notify();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.notify();
    }

    /// Inserts a freshly ingested document at the head, or replaces it in
    /// place after reprocessing.
    pub fn upsert_document(&mut self, document: Document) {
        if let Some(existing) = self.documents.iter_mut().find(|d| d.id == document.id) {
            *existing = document;
        } else {
            self.documents.insert(0, document);
        }
        self.notify();
    }

    pub fn remove_document(&mut self, id: &Uuid) {
        self.documents.retain(|d| d.id != *id);
        self.selected.remove(id);
        self.notify();
    }

    /// Selected documents in document-list order.
    pub fn selected_documents(&self) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|d| self.selected.contains(&d.id))
            .cloned()
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.documents
            .iter()
            .filter(|d| self.selected.contains(&d.id))
            .map(|d| d.id)
            .collect()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let mut ids: Vec<Uuid> = self.selected.iter().copied().collect();
        ids.sort();
        SelectionSnapshot(ids)
    }

    pub fn is_selected(&self, id: &Uuid) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn subscribe<F: Fn(&SelectionChange) + 'static>(&mut self, callback: F) {
        self.subscribers.push(Box::new(callback));
    }

    fn notify(&self) {
        let change = SelectionChange {
            selected: self.selected.len(),
            total: self.documents.len(),
            snapshot: self.snapshot(),
        };
        for subscriber in &self.subscribers {
            subscriber(&change);
        }
    }
}
