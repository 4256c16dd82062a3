//! Typed client boundary for the remote agent endpoints.
//!
//! The agents (ingest, extract, chat, analytics, export) are opaque remote
//! services with a JSON contract; everything the orchestration core knows
//! about them lives here. `AgentGateway` is the seam; orchestrators are
//! generic over it, production uses `HttpAgentGateway`, tests use
//! `MockAgentGateway`.

pub mod client;
pub mod mock;
pub mod types;

pub use client::HttpAgentGateway;
pub use mock::MockAgentGateway;
pub use types::{
    AnalyticsReport, ExportResponse, ExportTable, IngestResponse, MonthlySpend, SpendSummary,
    VendorSpend,
};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Document, ExportFormat};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent backend unreachable at {0}")]
    Connection(String),

    #[error("Agent request timed out after {0}s")]
    Timeout(u64),

    #[error("Agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse agent response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

/// The four remote analysis operations plus export.
///
/// Documents are posted in full; the agents read `filename`,
/// `extracted_data`, and `status` and ignore the rest.
pub trait AgentGateway {
    /// Upload a raw file for OCR, classification, and summarization.
    fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<IngestResponse, AgentError>;

    /// Extract structured fields from text. Keys are free-form and aliased
    /// ("Vendor Name" vs `vendor_name`); resolution happens in the pipeline.
    fn extract(&self, text: &str, doc_type: &str) -> Result<Map<String, Value>, AgentError>;

    /// Answer a user message against the serialized document context.
    fn chat(&self, message: &str, context: &str) -> Result<String, AgentError>;

    /// Aggregate statistics over a document subset; with `query` set, the
    /// report also carries a natural-language `query_response`.
    fn analytics(
        &self,
        documents: &[Document],
        query: Option<&str>,
    ) -> Result<AnalyticsReport, AgentError>;

    /// Format a document subset for download. Text formats return content,
    /// excel returns structured table data only.
    fn export(
        &self,
        documents: &[Document],
        format: &ExportFormat,
    ) -> Result<ExportResponse, AgentError>;
}
