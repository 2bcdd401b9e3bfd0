//! Paginated export orchestration.
//!
//! An export is served as a sequence of bounded page fetches:
//!
//! 1. [`PreparedExport::start`] fetches the first page and opens the writer.
//!    A missing resource fails here, before any response byte exists.
//! 2. [`PreparedExport::stream`] writes every page in order and fetches the
//!    next one until the window is exhausted or a short page arrives, then
//!    finishes the writer.
//!
//! Output is drained from the writer into a [`ChunkSink`] whenever
//! [`EXPORT_CHUNK_BYTES`] have accumulated and at every page boundary.

use std::mem;

use bytes::Bytes;
use log::{debug, info, warn};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::sink::ChunkSink;
use super::types::{ExportOutcome, ExportRequest, ExportSummary};
use super::writer::FormatWriter;
use crate::config::{EXPORT_CHUNK_BYTES, PAGINATE_BY};
use crate::error_handling::ExportError;
use crate::storage::{fetch_page, Column, DataStore, Record};

/// Position of the next page within the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    offset: u64,
    remaining: Option<u64>,
}

impl Window {
    fn new(offset: u64, limit: Option<u64>) -> Self {
        Self {
            offset,
            remaining: limit,
        }
    }

    /// Rows to request next: never more than [`PAGINATE_BY`].
    fn page_size(&self) -> u64 {
        self.remaining
            .map_or(PAGINATE_BY, |remaining| remaining.min(PAGINATE_BY))
    }

    fn advance(&mut self, rows: u64) {
        self.offset = self.offset.saturating_add(rows);
        self.remaining = self.remaining.map(|r| r.saturating_sub(rows));
    }

    fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// An export whose first page has been fetched and whose writer is open.
pub struct PreparedExport {
    request: ExportRequest,
    columns: Vec<Column>,
    writer: FormatWriter<Vec<u8>>,
    records: Vec<Record>,
    requested: u64,
    window: Window,
}

impl PreparedExport {
    /// Fetches the first page and opens the writer with its columns.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Store` when the first fetch fails (including
    /// `NotFound`); nothing has been written at that point.
    pub async fn start(store: &dyn DataStore, request: ExportRequest) -> Result<Self, ExportError> {
        let window = Window::new(request.offset, request.limit);
        let requested = window.page_size();
        let page = fetch_page(store, &request.resource_id, window.offset, requested).await?;

        let writer = FormatWriter::open(
            request.format,
            Vec::new(),
            &page.columns,
            request.resource_id.as_str(),
            request.bom,
        )?;

        Ok(Self {
            request,
            columns: page.columns,
            writer,
            records: page.records,
            requested,
            window,
        })
    }

    /// Columns resolved from the first page, in output order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Value of the `Content-Type` response header.
    pub fn content_type(&self) -> &'static str {
        self.writer.content_type()
    }

    /// Value of the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        self.writer.content_disposition()
    }

    /// Writes every page of the window into `sink`.
    ///
    /// Stops early with [`ExportOutcome::Cancelled`] when the sink closes or
    /// `cancel` fires. The writer is finished on every exit path; its trailer
    /// is delivered only when the sink is still open.
    ///
    /// # Errors
    ///
    /// A page fetch or encoding failure after streaming has begun. The sink
    /// has been aborted by then.
    pub async fn stream<S: ChunkSink + ?Sized>(
        self,
        store: &dyn DataStore,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        let PreparedExport {
            request,
            columns,
            mut writer,
            records,
            requested,
            window,
        } = self;

        info!(
            "Export started: {} format={} offset={} limit={:?}",
            request.resource_id,
            request.format.as_str(),
            request.offset,
            request.limit
        );

        let mut pump = Pump {
            store,
            resource_id: &request.resource_id,
            columns: &columns,
            rows_written: 0,
            pages_fetched: 1,
        };
        let pumped = pump
            .run(&mut writer, &mut *sink, cancel, records, requested, window)
            .await;
        let (rows_written, pages_fetched) = (pump.rows_written, pump.pages_fetched);

        // Finish unconditionally; the trailer is dropped if the sink is gone
        let finished = writer.finish();

        let outcome = match (pumped, finished) {
            (Ok(ExportOutcome::Completed), Ok(trailer)) => {
                if send(&mut *sink, trailer).await {
                    ExportOutcome::Completed
                } else {
                    ExportOutcome::Cancelled
                }
            }
            (Ok(ExportOutcome::Cancelled), _) => ExportOutcome::Cancelled,
            (Err(e), finished) => {
                if let Ok(trailer) = finished {
                    send(&mut *sink, trailer).await;
                }
                warn!(
                    "Export of {} failed after {} rows: {}",
                    request.resource_id, rows_written, e
                );
                sink.abort(e.to_string()).await;
                return Err(e);
            }
            (Ok(ExportOutcome::Completed), Err(e)) => {
                warn!("Export of {} failed to finish: {}", request.resource_id, e);
                sink.abort(e.to_string()).await;
                return Err(e);
            }
        };

        if cancel.is_cancelled() && outcome == ExportOutcome::Cancelled {
            sink.abort("export cancelled".to_string()).await;
        }

        let summary = ExportSummary {
            rows_written,
            pages_fetched,
            outcome,
        };
        match outcome {
            ExportOutcome::Completed => info!(
                "Export finished: {} rows={} pages={}",
                request.resource_id, rows_written, pages_fetched
            ),
            ExportOutcome::Cancelled => info!(
                "Export cancelled: {} rows={} pages={}",
                request.resource_id, rows_written, pages_fetched
            ),
        }
        Ok(summary)
    }
}

/// Runs a whole export into `sink`.
///
/// # Errors
///
/// Any failure of [`PreparedExport::start`] or [`PreparedExport::stream`].
pub async fn run_export<S: ChunkSink + ?Sized>(
    store: &dyn DataStore,
    request: ExportRequest,
    sink: &mut S,
    cancel: &CancellationToken,
) -> Result<ExportSummary, ExportError> {
    PreparedExport::start(store, request)
        .await?
        .stream(store, sink, cancel)
        .await
}

/// Page loop state; counters survive an early return so they can be reported.
struct Pump<'a> {
    store: &'a dyn DataStore,
    resource_id: &'a str,
    columns: &'a [Column],
    rows_written: u64,
    pages_fetched: u64,
}

impl Pump<'_> {
    async fn run<S: ChunkSink + ?Sized>(
        &mut self,
        writer: &mut FormatWriter<Vec<u8>>,
        sink: &mut S,
        cancel: &CancellationToken,
        mut records: Vec<Record>,
        mut requested: u64,
        mut window: Window,
    ) -> Result<ExportOutcome, ExportError> {
        loop {
            // A store must not widen the window
            records.truncate(usize::try_from(requested).unwrap_or(usize::MAX));
            let count = records.len() as u64;

            for record in records {
                writer.write_row(&project(self.columns, record))?;
                self.rows_written += 1;
                if writer.get_mut().len() >= EXPORT_CHUNK_BYTES && !drain(writer, &mut *sink).await {
                    return Ok(ExportOutcome::Cancelled);
                }
            }
            if !drain(writer, &mut *sink).await {
                return Ok(ExportOutcome::Cancelled);
            }

            window.advance(count);
            if count < requested || window.exhausted() {
                return Ok(ExportOutcome::Completed);
            }
            if cancel.is_cancelled() {
                debug!("Export of {} interrupted by shutdown", self.resource_id);
                return Ok(ExportOutcome::Cancelled);
            }

            requested = window.page_size();
            let page = fetch_page(self.store, self.resource_id, window.offset, requested).await?;
            self.pages_fetched += 1;
            records = page.records;
        }
    }
}

/// Orders a record's values by `columns`; missing keys become `null`.
fn project(columns: &[Column], mut record: Record) -> Vec<Value> {
    columns
        .iter()
        .map(|column| record.remove(&column.id).unwrap_or(Value::Null))
        .collect()
}

/// Hands the writer's buffered output to the sink. False once the sink is closed.
async fn drain<S: ChunkSink + ?Sized>(writer: &mut FormatWriter<Vec<u8>>, sink: &mut S) -> bool {
    let buffered = mem::take(writer.get_mut());
    send(sink, buffered).await
}

async fn send<S: ChunkSink + ?Sized>(sink: &mut S, bytes: Vec<u8>) -> bool {
    if bytes.is_empty() {
        return true;
    }
    sink.send_chunk(Bytes::from(bytes)).await.is_ok()
}
