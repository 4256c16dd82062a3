use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::models::{Document, ExportFormat};

use super::types::{AnalyticsReport, ExportResponse, IngestResponse, SpendSummary};
use super::{AgentError, AgentGateway};

/// Scripted gateway for tests. Each operation returns a canned response or a
/// connection failure, and every call is recorded in order.
pub struct MockAgentGateway {
    ingest_response: IngestResponse,
    fail_ingest: bool,
    extract_response: Map<String, Value>,
    fail_extract: bool,
    chat_response: String,
    fail_chat: bool,
    analytics_queue: RefCell<VecDeque<AnalyticsReport>>,
    fail_analytics: bool,
    export_response: ExportResponse,
    fail_export: bool,
    calls: RefCell<Vec<String>>,
}

fn canned_extract() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("Vendor Name".into(), Value::String("Acme Corp".into()));
    fields.insert("Total Amount".into(), Value::String("$500.00".into()));
    fields.insert("Invoice Date".into(), Value::String("2024-01-15".into()));
    fields.insert("Invoice Number".into(), Value::String("INV-1001".into()));
    fields
}

impl Default for MockAgentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgentGateway {
    pub fn new() -> Self {
        Self {
            ingest_response: IngestResponse {
                doc_type: "invoice".into(),
                summary: "Invoice from Acme Corp for web services.".into(),
                confidence: 0.95,
                full_text: "Invoice #1001 from Acme Corp. Total: $500.00".into(),
                thumbnail_url: String::new(),
            },
            fail_ingest: false,
            extract_response: canned_extract(),
            fail_extract: false,
            chat_response: "Both invoices are from Acme Corp.".into(),
            fail_chat: false,
            analytics_queue: RefCell::new(VecDeque::new()),
            fail_analytics: false,
            export_response: ExportResponse {
                filename: "rida_export.csv".into(),
                content: Some("Filename,Vendor\ninvoice.pdf,Acme Corp\n".into()),
                data: None,
            },
            fail_export: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_ingest(mut self, response: IngestResponse) -> Self {
        self.ingest_response = response;
        self
    }

    pub fn failing_ingest(mut self) -> Self {
        self.fail_ingest = true;
        self
    }

    pub fn with_extract(mut self, fields: Map<String, Value>) -> Self {
        self.extract_response = fields;
        self
    }

    pub fn failing_extract(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    pub fn with_chat(mut self, response: &str) -> Self {
        self.chat_response = response.to_string();
        self
    }

    pub fn failing_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    /// Queues a report; successive analytics calls pop in FIFO order. An
    /// empty queue synthesizes a report sized to the request.
    pub fn queue_analytics(self, report: AnalyticsReport) -> Self {
        self.analytics_queue.borrow_mut().push_back(report);
        self
    }

    pub fn failing_analytics(mut self) -> Self {
        self.fail_analytics = true;
        self
    }

    pub fn with_export(mut self, response: ExportResponse) -> Self {
        self.export_response = response;
        self
    }

    pub fn failing_export(mut self) -> Self {
        self.fail_export = true;
        self
    }

    /// Operation names in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &str) {
        self.calls.borrow_mut().push(name.to_string());
    }

    fn unreachable_error() -> AgentError {
        AgentError::Connection("http://localhost:8000".into())
    }
}

impl AgentGateway for MockAgentGateway {
    fn ingest(&self, _filename: &str, _bytes: &[u8]) -> Result<IngestResponse, AgentError> {
        self.record("ingest");
        if self.fail_ingest {
            return Err(Self::unreachable_error());
        }
        Ok(self.ingest_response.clone())
    }

    fn extract(&self, _text: &str, _doc_type: &str) -> Result<Map<String, Value>, AgentError> {
        self.record("extract");
        if self.fail_extract {
            return Err(Self::unreachable_error());
        }
        Ok(self.extract_response.clone())
    }

    fn chat(&self, _message: &str, _context: &str) -> Result<String, AgentError> {
        self.record("chat");
        if self.fail_chat {
            return Err(Self::unreachable_error());
        }
        Ok(self.chat_response.clone())
    }

    fn analytics(
        &self,
        documents: &[Document],
        _query: Option<&str>,
    ) -> Result<AnalyticsReport, AgentError> {
        self.record("analytics");
        if self.fail_analytics {
            return Err(Self::unreachable_error());
        }
        if let Some(report) = self.analytics_queue.borrow_mut().pop_front() {
            return Ok(report);
        }
        Ok(AnalyticsReport {
            summary: SpendSummary {
                total_documents: documents.len() as u64,
                ..SpendSummary::default()
            },
            ..AnalyticsReport::default()
        })
    }

    fn export(
        &self,
        _documents: &[Document],
        _format: &ExportFormat,
    ) -> Result<ExportResponse, AgentError> {
        self.record("export");
        if self.fail_export {
            return Err(Self::unreachable_error());
        }
        Ok(self.export_response.clone())
    }
}
