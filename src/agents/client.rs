use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config;
use crate::models::{Document, ExportFormat};

use super::types::{AnalyticsReport, ExportResponse, IngestResponse};
use super::{AgentError, AgentGateway};

/// HTTP client for the agent service. One instance per pipeline; the
/// underlying reqwest client pools connections.
pub struct HttpAgentGateway {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
    doc_type: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct AnalyticsRequest<'a> {
    documents: &'a [Document],
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
}

#[derive(Serialize)]
struct ExportRequest<'a> {
    documents: &'a [Document],
    format: &'a ExportFormat,
}

impl HttpAgentGateway {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Builds a gateway from `RIDA_AGENT_URL`, falling back to localhost.
    pub fn from_env() -> Self {
        Self::new(&config::agent_base_url(), config::DEFAULT_AGENT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, e: reqwest::Error) -> AgentError {
        if e.is_connect() {
            AgentError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            AgentError::Timeout(self.timeout_secs)
        } else {
            AgentError::Http(e.to_string())
        }
    }

    fn check_status(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, AgentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AgentError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.map_error(e))?;
        let response = self.check_status(response)?;
        response
            .json()
            .map_err(|e| AgentError::ResponseParsing(e.to_string()))
    }
}

impl AgentGateway for HttpAgentGateway {
    fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<IngestResponse, AgentError> {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let part = reqwest::blocking::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| AgentError::Http(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let url = format!("{}/agents/ingest", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| self.map_error(e))?;
        let response = self.check_status(response)?;
        response
            .json()
            .map_err(|e| AgentError::ResponseParsing(e.to_string()))
    }

    fn extract(&self, text: &str, doc_type: &str) -> Result<Map<String, Value>, AgentError> {
        self.post_json("/agents/extract", &ExtractRequest { text, doc_type })
    }

    fn chat(&self, message: &str, context: &str) -> Result<String, AgentError> {
        let parsed: ChatResponse =
            self.post_json("/agents/chat", &ChatRequest { message, context })?;
        Ok(parsed.response)
    }

    fn analytics(
        &self,
        documents: &[Document],
        query: Option<&str>,
    ) -> Result<AnalyticsReport, AgentError> {
        self.post_json("/agents/analytics", &AnalyticsRequest { documents, query })
    }

    fn export(
        &self,
        documents: &[Document],
        format: &ExportFormat,
    ) -> Result<ExportResponse, AgentError> {
        self.post_json("/agents/export", &ExportRequest { documents, format })
    }
}
