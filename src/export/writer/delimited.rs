//! Delimited text encoding (CSV and TSV).
//!
//! One header record of column ids, then one record per row. Records end in
//! `\r\n`; fields are quoted only when they contain the delimiter, a quote or
//! a line break. There is no footer.

use std::borrow::Cow;
use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

use crate::storage::Column;

pub(super) struct DelimitedEncoder {
    builder: WriterBuilder,
}

impl DelimitedEncoder {
    pub(super) fn new(delimiter: u8) -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .buffer_capacity(1024);
        Self { builder }
    }

    pub(super) fn write_header<W: Write>(
        &self,
        out: &mut W,
        columns: &[Column],
    ) -> Result<(), csv::Error> {
        let mut writer = self.builder.from_writer(out);
        writer.write_record(columns.iter().map(|c| c.id.as_str()))?;
        writer.flush()?;
        Ok(())
    }

    pub(super) fn write_row<W: Write>(&self, out: &mut W, row: &[Value]) -> Result<(), csv::Error> {
        let mut writer = self.builder.from_writer(out);
        writer.write_record(row.iter().map(field_bytes))?;
        writer.flush()?;
        Ok(())
    }
}

/// Bytes of one field: strings verbatim, `null` empty, containers as compact JSON.
fn field_bytes(value: &Value) -> Cow<'_, [u8]> {
    match value {
        Value::Null => Cow::Borrowed(&b""[..]),
        Value::String(s) => Cow::Borrowed(s.as_bytes()),
        Value::Bool(true) => Cow::Borrowed(&b"true"[..]),
        Value::Bool(false) => Cow::Borrowed(&b"false"[..]),
        Value::Number(n) => Cow::Owned(n.to_string().into_bytes()),
        other => Cow::Owned(other.to_string().into_bytes()),
    }
}
