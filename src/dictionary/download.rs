//! CSV download of a data dictionary.

use csv::{Terminator, WriterBuilder};

use crate::config::DICTIONARY_CSV_HEADER;
use crate::storage::Column;

/// Renders `column,type,label,description` plus one row per column.
///
/// `label` and `description` come from the `label` and `notes` info keys.
///
/// # Errors
///
/// Returns an error if a record cannot be encoded.
pub fn dictionary_csv(columns: &[Column]) -> Result<Vec<u8>, csv::Error> {
    let mut out = Vec::new();
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(&mut out);
    writer.write_record(DICTIONARY_CSV_HEADER)?;
    for column in columns {
        writer.write_record([
            column.id.clone(),
            column.column_type.clone(),
            column.info_text("label"),
            column.info_text("notes"),
        ])?;
    }
    writer.flush()?;
    drop(writer);
    Ok(out)
}
