//! Streaming export of datastore resources.
//!
//! Requests are validated up front ([`ExportRequest::from_params`]), then
//! served page by page through a [`FormatWriter`] into a [`ChunkSink`].

mod pipeline;
mod sink;
mod types;
mod validation;
mod writer;

pub use pipeline::{run_export, PreparedExport};
pub use sink::{ChannelSink, ChunkSink, SinkClosed};
pub use types::{ExportFormat, ExportOutcome, ExportRequest, ExportSummary};
pub use validation::{parse_bom, parse_format, parse_limit, parse_offset};
pub use writer::FormatWriter;
