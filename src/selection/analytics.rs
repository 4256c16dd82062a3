//! Selection-scoped spend analytics.
//!
//! Every fetch is tagged with the selection snapshot it was computed for;
//! results are applied only if that snapshot still matches the store, so a
//! slow response for an old selection can never overwrite a newer one.

use crate::agents::{AgentError, AgentGateway, AnalyticsReport};

use super::{SelectionSnapshot, SelectionStore};

/// Shown as the report state when the analytics agent is unreachable.
pub const ANALYTICS_ERROR_PLACEHOLDER: &str = "Failed to load analytics. Please try again.";

/// Returned for a natural-language query the agent could not answer.
pub const QUERY_ERROR_PLACEHOLDER: &str = "Error processing query. Please try again.";

/// Returned when the agent answers a query with no response text.
pub const QUERY_EMPTY_RESPONSE: &str = "No response received";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalyticsState {
    #[default]
    Idle,
    Loaded(AnalyticsReport),
    Error(String),
}

/// A completed fetch, not yet applied to the view.
pub struct AnalyticsUpdate {
    snapshot: SelectionSnapshot,
    outcome: Result<AnalyticsReport, AgentError>,
}

/// Whether an update matched the live selection when applied.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

pub struct AnalyticsView<'a, G: AgentGateway> {
    gateway: &'a G,
    state: AnalyticsState,
    loading: bool,
}

impl<'a, G: AgentGateway> AnalyticsView<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            state: AnalyticsState::Idle,
            loading: false,
        }
    }

    pub fn state(&self) -> &AnalyticsState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Runs the analytics call for the current selection and returns the
    /// tagged result. The view stays in loading until an update for the
    /// live selection is applied.
    pub fn fetch(&mut self, store: &SelectionStore) -> AnalyticsUpdate {
        self.loading = true;
        let snapshot = store.snapshot();
        let documents = store.selected_documents();
        let outcome = self.gateway.analytics(&documents, None);
        AnalyticsUpdate { snapshot, outcome }
    }

    /// Applies an update if its snapshot still matches the store.
    ///
    /// A stale update is discarded whole; neither the state nor the loading
    /// flag moves, because the in-flight fetch for the live selection still
    /// owns them.
    pub fn apply(&mut self, store: &SelectionStore, update: AnalyticsUpdate) -> Applied {
        if update.snapshot != store.snapshot() {
            tracing::debug!(
                stale_selection_size = update.snapshot.len(),
                "Discarding analytics result for a superseded selection"
            );
            return Applied::Stale;
        }
        self.loading = false;
        self.state = match update.outcome {
            Ok(report) => AnalyticsState::Loaded(report),
            Err(e) => {
                tracing::warn!(error = %e, "Analytics agent unavailable");
                AnalyticsState::Error(ANALYTICS_ERROR_PLACEHOLDER.to_string())
            }
        };
        Applied::Current
    }

    /// Fetch and apply in one step, for callers with no concurrent fetches.
    pub fn refresh(&mut self, store: &SelectionStore) -> Applied {
        let update = self.fetch(store);
        self.apply(store, update)
    }

    /// Answers a natural-language question over the current selection.
    /// Always resolves to displayable text; failures surface as placeholder
    /// strings, never as errors.
    pub fn query(&mut self, store: &SelectionStore, question: &str) -> String {
        self.loading = true;
        let documents = store.selected_documents();
        let result = self.gateway.analytics(&documents, Some(question));
        self.loading = false;
        match result {
            Ok(report) => report
                .query_response
                .unwrap_or_else(|| QUERY_EMPTY_RESPONSE.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Analytics query failed");
                QUERY_ERROR_PLACEHOLDER.to_string()
            }
        }
    }
}
