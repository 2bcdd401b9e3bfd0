//! XML encoding.
//!
//! ```text
//! <data xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
//! <row _id="1"><name>a</name><tags><value key="0">x</value></tags></row>
//! </data>
//! ```
//!
//! A leading `_id` column becomes an attribute of `<row>`. Every other column
//! is a child element named after the column id.

use std::borrow::Cow;
use std::io::Write;

use serde_json::Value;

use crate::error_handling::ExportError;
use crate::storage::Column;
use crate::utils::escape_markup;

const ID_COLUMN: &str = "_id";
const VALUE_TAG: &str = "value";
const KEY_ATTR: &str = "key";

pub(super) struct XmlEncoder {
    id_column: bool,
    columns: Vec<String>,
}

impl XmlEncoder {
    pub(super) fn new(columns: &[Column]) -> Self {
        let id_column = columns.first().is_some_and(|c| c.id == ID_COLUMN);
        let skip = usize::from(id_column);
        Self {
            id_column,
            columns: columns.iter().skip(skip).map(|c| c.id.clone()).collect(),
        }
    }

    pub(super) fn write_prologue<W: Write>(&self, out: &mut W) -> Result<(), ExportError> {
        out.write_all(b"<data xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n")?;
        Ok(())
    }

    pub(super) fn write_row<W: Write>(&self, out: &mut W, row: &[Value]) -> Result<(), ExportError> {
        let mut xml = String::from("<row");
        let mut values = row.iter();
        if self.id_column {
            if let Some(id) = values.next() {
                push_attr(&mut xml, ID_COLUMN, &scalar_text(id));
            }
        }

        let mut body = String::new();
        for (column, value) in self.columns.iter().zip(values) {
            push_node(&mut body, column, value, None);
        }
        close_element(&mut xml, "row", &body);
        xml.push('\n');

        out.write_all(xml.as_bytes())?;
        Ok(())
    }

    pub(super) fn write_trailer<W: Write>(&self, out: &mut W) -> Result<(), ExportError> {
        out.write_all(b"</data>\n")?;
        Ok(())
    }
}

fn push_attr(xml: &mut String, name: &str, value: &str) {
    xml.push(' ');
    xml.push_str(name);
    xml.push_str("=\"");
    xml.push_str(&escape_markup(&xml_chars(value)));
    xml.push('"');
}

/// Ends an open start tag: self-closing when `body` is empty.
fn close_element(xml: &mut String, tag: &str, body: &str) {
    if body.is_empty() {
        xml.push_str(" />");
    } else {
        xml.push('>');
        xml.push_str(body);
        xml.push_str("</");
        xml.push_str(tag);
        xml.push('>');
    }
}

fn push_node(xml: &mut String, tag: &str, value: &Value, key: Option<&str>) {
    xml.push('<');
    xml.push_str(tag);
    if value.is_null() {
        push_attr(xml, "xsi:nil", "true");
    }
    if let Some(key) = key {
        push_attr(xml, KEY_ATTR, key);
    }

    let mut body = String::new();
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_node(&mut body, VALUE_TAG, item, Some(&index.to_string()));
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                push_node(&mut body, VALUE_TAG, item, Some(name));
            }
        }
        scalar => body.push_str(&escape_markup(&xml_chars(&scalar_text(scalar)))),
    }
    close_element(xml, tag, &body);
}

/// Drops characters XML 1.0 cannot carry, even as character references.
fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
