//! JSON encoding.
//!
//! ```text
//! {
//!   "fields": [{"id":"a","type":"int"}],
//!   "records": [
//!     [1],
//!     [2]
//! ]}
//! ```

use std::io::Write;

use serde_json::Value;

use crate::error_handling::ExportError;
use crate::storage::Column;

pub(super) struct JsonEncoder {
    first: bool,
}

impl JsonEncoder {
    pub(super) fn new() -> Self {
        Self { first: true }
    }

    pub(super) fn write_prologue<W: Write>(
        &self,
        out: &mut W,
        columns: &[Column],
    ) -> Result<(), ExportError> {
        out.write_all(b"{\n  \"fields\": ")?;
        serde_json::to_writer(&mut *out, columns)?;
        out.write_all(b",\n  \"records\": [")?;
        Ok(())
    }

    pub(super) fn write_row<W: Write>(
        &mut self,
        out: &mut W,
        row: &[Value],
    ) -> Result<(), ExportError> {
        if self.first {
            self.first = false;
            out.write_all(b"\n    ")?;
        } else {
            out.write_all(b",\n    ")?;
        }
        serde_json::to_writer(&mut *out, row)?;
        Ok(())
    }

    pub(super) fn write_trailer<W: Write>(&self, out: &mut W) -> Result<(), ExportError> {
        out.write_all(b"\n]}\n")?;
        Ok(())
    }
}
