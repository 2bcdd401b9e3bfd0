//! Export types and options.

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Export format options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// A JSON object with `fields` and `records`
    Json,
    /// One `<row>` element per record inside `<data>`
    Xml,
}

impl ExportFormat {
    /// The `format` query value selecting this variant; also the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }

    /// Parses a `format` query value (case-sensitive, as served in links).
    pub fn from_param(value: &str) -> Option<Self> {
        Self::iter().find(|format| format.as_str() == value)
    }

    /// Value of the `Content-Type` response header.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Tsv => "text/tab-separated-values; charset=utf-8",
            ExportFormat::Json => "application/json; charset=utf-8",
            ExportFormat::Xml => "text/xml; charset=utf-8",
        }
    }

    /// Download file name for a resource.
    pub fn filename(self, resource_id: &str) -> String {
        format!("{}.{}", resource_id, self.as_str())
    }

    /// Comma-separated list of every supported format.
    pub fn supported() -> String {
        Self::iter()
            .map(ExportFormat::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A validated export request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    /// Resource to export
    pub resource_id: String,
    /// Number of leading rows to skip
    pub offset: u64,
    /// Maximum number of rows (None = everything after `offset`)
    pub limit: Option<u64>,
    /// Output encoding
    pub format: ExportFormat,
    /// Emit a UTF-8 byte order mark first
    pub bom: bool,
}

/// How a streamed export ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Every requested row was written and the trailer delivered.
    Completed,
    /// The client went away or the server is shutting down; fetching stopped early.
    Cancelled,
}

/// Counters reported once an export stream ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    /// Rows handed to the writer
    pub rows_written: u64,
    /// Store calls made, including the first page
    pub pages_fetched: u64,
    /// How the stream ended
    pub outcome: ExportOutcome,
}
