use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body from `POST /agents/ingest`.
///
/// Any field the agent omits deserializes to its default; a missing field is
/// never an error at this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub confidence: f64,
    /// The agent historically returned this under `text`.
    #[serde(default, alias = "text")]
    pub full_text: String,
    #[serde(default)]
    pub thumbnail_url: String,
}

impl IngestResponse {
    /// Fixed substitute used when the ingest agent is unreachable, so
    /// ingestion never blocks persistence.
    pub fn fallback() -> Self {
        Self {
            doc_type: "unknown".into(),
            summary: "Pending analysis...".into(),
            confidence: 0.0,
            full_text: String::new(),
            thumbnail_url: String::new(),
        }
    }
}

/// Response body from `POST /agents/analytics`.
///
/// Monetary amounts arrive as formatted strings (e.g. `"$500.00"`) and are
/// displayed verbatim, never re-parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    #[serde(default)]
    pub summary: SpendSummary,
    #[serde(default)]
    pub by_vendor: Vec<VendorSpend>,
    #[serde(default)]
    pub monthly_trends: Vec<MonthlySpend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_response: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendSummary {
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub total_spend: String,
    #[serde(default)]
    pub average_spend: String,
    #[serde(default)]
    pub highest_amount: String,
    #[serde(default)]
    pub lowest_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSpend {
    pub vendor: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySpend {
    pub month: String,
    #[serde(default)]
    pub total: String,
}

/// Response body from `POST /agents/export`: `content` for text formats,
/// `data` for excel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportResponse {
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExportTable>,
}

/// Structured spreadsheet rows; binary encoding is deliberately not done here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default, rename = "data")]
    pub rows: Vec<Map<String, Value>>,
}
