//! Export of the selected documents through the agent service.
//!
//! The agent renders the export; this module validates the response shape
//! for the requested format and can save text artifacts to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::agents::{AgentError, AgentGateway, ExportTable};
use crate::models::ExportFormat;
use crate::selection::SelectionStore;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Export response is missing {0} for the requested format")]
    MissingContent(&'static str),

    #[error("Spreadsheet exports are structured data and cannot be saved as text")]
    StructuredArtifact,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated export, ready to hand to the caller or write to disk.
#[derive(Debug, Clone)]
pub enum ExportArtifact {
    /// csv and quickbooks: complete file content as text.
    Text { filename: String, content: String },
    /// excel: headers and rows for a spreadsheet writer.
    Table {
        filename: String,
        table: ExportTable,
    },
}

impl ExportArtifact {
    pub fn filename(&self) -> &str {
        match self {
            Self::Text { filename, .. } | Self::Table { filename, .. } => filename,
        }
    }

    /// Writes a text artifact into `dir` and returns the written path.
    /// Table artifacts have no local byte representation and are refused.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        match self {
            Self::Text { filename, content } => {
                fs::create_dir_all(dir)?;
                let path = dir.join(filename);
                fs::write(&path, content)?;
                tracing::info!(path = %path.display(), "Export saved");
                Ok(path)
            }
            Self::Table { .. } => Err(ExportError::StructuredArtifact),
        }
    }
}

pub struct ExportFormatter<'a, G: AgentGateway> {
    gateway: &'a G,
}

impl<'a, G: AgentGateway> ExportFormatter<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Exports the current selection in the given format.
    ///
    /// The response must carry the field the format implies: `content` for
    /// text formats, `data` for excel. A response missing it is an error,
    /// never an empty artifact.
    pub fn export(
        &self,
        store: &SelectionStore,
        format: &ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let documents = store.selected_documents();
        let response = self.gateway.export(&documents, format)?;

        let artifact = match format {
            ExportFormat::Excel => ExportArtifact::Table {
                filename: response.filename,
                table: response.data.ok_or(ExportError::MissingContent("data"))?,
            },
            ExportFormat::Csv | ExportFormat::Quickbooks => ExportArtifact::Text {
                filename: response.filename,
                content: response
                    .content
                    .ok_or(ExportError::MissingContent("content"))?,
            },
        };

        tracing::info!(
            format = format.as_str(),
            filename = artifact.filename(),
            documents = documents.len(),
            "Export formatted"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{ExportResponse, MockAgentGateway};

    fn csv_response() -> ExportResponse {
        ExportResponse {
            filename: "rida_export.csv".into(),
            content: Some("Filename,Vendor\na.pdf,Acme Corp\n".into()),
            data: None,
        }
    }

    fn excel_response() -> ExportResponse {
        let mut row = serde_json::Map::new();
        row.insert("Filename".into(), "a.pdf".into());
        ExportResponse {
            filename: "rida_export.xlsx".into(),
            content: None,
            data: Some(ExportTable {
                headers: vec!["Filename".into()],
                rows: vec![row],
            }),
        }
    }

    #[test]
    fn csv_export_yields_text_artifact() {
        let mock = MockAgentGateway::new().with_export(csv_response());
        let formatter = ExportFormatter::new(&mock);

        let artifact = formatter
            .export(&SelectionStore::new(), &ExportFormat::Csv)
            .unwrap();

        match artifact {
            ExportArtifact::Text { filename, content } => {
                assert_eq!(filename, "rida_export.csv");
                assert!(content.starts_with("Filename,Vendor"));
            }
            other => panic!("unexpected artifact: {other:?}"),
        }
    }

    #[test]
    fn excel_export_yields_table_artifact() {
        let mock = MockAgentGateway::new().with_export(excel_response());
        let formatter = ExportFormatter::new(&mock);

        let artifact = formatter
            .export(&SelectionStore::new(), &ExportFormat::Excel)
            .unwrap();

        match artifact {
            ExportArtifact::Table { table, .. } => {
                assert_eq!(table.headers, vec!["Filename"]);
                assert_eq!(table.rows.len(), 1);
            }
            other => panic!("unexpected artifact: {other:?}"),
        }
    }

    #[test]
    fn excel_response_without_data_is_an_error() {
        let mock = MockAgentGateway::new().with_export(csv_response());
        let formatter = ExportFormatter::new(&mock);

        let err = formatter
            .export(&SelectionStore::new(), &ExportFormat::Excel)
            .unwrap_err();

        assert!(matches!(err, ExportError::MissingContent("data")));
    }

    #[test]
    fn text_format_without_content_is_an_error() {
        let mock = MockAgentGateway::new().with_export(excel_response());
        let formatter = ExportFormatter::new(&mock);

        let err = formatter
            .export(&SelectionStore::new(), &ExportFormat::Quickbooks)
            .unwrap_err();

        assert!(matches!(err, ExportError::MissingContent("content")));
    }

    #[test]
    fn agent_failure_propagates() {
        let mock = MockAgentGateway::new().failing_export();
        let formatter = ExportFormatter::new(&mock);

        let err = formatter
            .export(&SelectionStore::new(), &ExportFormat::Csv)
            .unwrap_err();

        assert!(matches!(err, ExportError::Agent(_)));
    }

    #[test]
    fn save_to_writes_text_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact::Text {
            filename: "out.csv".into(),
            content: "a,b\n1,2\n".into(),
        };

        let path = artifact.save_to(dir.path()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn save_to_refuses_table_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact::Table {
            filename: "out.xlsx".into(),
            table: ExportTable::default(),
        };

        let err = artifact.save_to(dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::StructuredArtifact));
    }
}
