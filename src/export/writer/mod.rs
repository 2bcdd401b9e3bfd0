//! Format writers.
//!
//! A [`FormatWriter`] is opened with the resolved column list, accepts rows
//! one at a time, and is consumed by [`FormatWriter::finish`], which emits
//! the format trailer and hands the output back. Rows are never buffered
//! inside the writer: every byte lands in the owned output immediately, so
//! the caller decides when to drain it.

mod delimited;
mod json;
mod xml;

use std::io::Write;

use serde_json::Value;

use crate::config::UTF8_BOM;
use crate::error_handling::ExportError;
use crate::export::types::ExportFormat;
use crate::storage::Column;
use crate::utils::attachment;

use delimited::DelimitedEncoder;
use json::JsonEncoder;
use xml::XmlEncoder;

enum Encoder {
    Delimited(DelimitedEncoder),
    Json(JsonEncoder),
    Xml(XmlEncoder),
}

/// Streaming writer for one export.
pub struct FormatWriter<W: Write> {
    out: W,
    encoder: Encoder,
    format: ExportFormat,
    resource_id: String,
}

impl<W: Write> FormatWriter<W> {
    /// Opens a writer and emits the optional byte order mark followed by the
    /// header (csv/tsv) or document prologue (json/xml).
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn open(
        format: ExportFormat,
        mut out: W,
        columns: &[Column],
        resource_id: impl Into<String>,
        bom: bool,
    ) -> Result<Self, ExportError> {
        if bom {
            out.write_all(UTF8_BOM)?;
        }

        let encoder = match format {
            ExportFormat::Csv | ExportFormat::Tsv => {
                let delimiter = if format == ExportFormat::Csv { b',' } else { b'\t' };
                let encoder = DelimitedEncoder::new(delimiter);
                encoder.write_header(&mut out, columns)?;
                Encoder::Delimited(encoder)
            }
            ExportFormat::Json => {
                let encoder = JsonEncoder::new();
                encoder.write_prologue(&mut out, columns)?;
                Encoder::Json(encoder)
            }
            ExportFormat::Xml => {
                let encoder = XmlEncoder::new(columns);
                encoder.write_prologue(&mut out)?;
                Encoder::Xml(encoder)
            }
        };

        Ok(Self {
            out,
            encoder,
            format,
            resource_id: resource_id.into(),
        })
    }

    /// Writes one row, given in resolved column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_row(&mut self, row: &[Value]) -> Result<(), ExportError> {
        match &mut self.encoder {
            Encoder::Delimited(encoder) => encoder.write_row(&mut self.out, row)?,
            Encoder::Json(encoder) => encoder.write_row(&mut self.out, row)?,
            Encoder::Xml(encoder) => encoder.write_row(&mut self.out, row)?,
        }
        Ok(())
    }

    /// Emits the format trailer and returns the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written or flushed.
    pub fn finish(mut self) -> Result<W, ExportError> {
        match &self.encoder {
            Encoder::Delimited(_) => {}
            Encoder::Json(encoder) => encoder.write_trailer(&mut self.out)?,
            Encoder::Xml(encoder) => encoder.write_trailer(&mut self.out)?,
        }
        self.out.flush()?;
        Ok(self.out)
    }

    /// Mutable access to the output, used to drain buffered bytes between rows.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Value of the `Content-Type` response header.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Download file name.
    pub fn filename(&self) -> String {
        self.format.filename(&self.resource_id)
    }

    /// Value of the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        attachment(&self.filename())
    }
}
