//! Unflattening of the dictionary editor form.
//!
//! The editor posts one input per column and key, named
//! `info__<index>__<key>`. The pairs are regrouped into an ordered edit list.

use serde_json::{Map, Value};

const INFO_PREFIX: &str = "info__";
const SEPARATOR: &str = "__";

/// Splits `info__<index>__<key>` into `(index, key)`.
fn info_key(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix(INFO_PREFIX)?;
    let (index, key) = rest.split_once(SEPARATOR)?;
    if key.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((index.parse().ok()?, key))
}

/// Regroups form pairs into per-column edit objects.
///
/// Indices at or beyond `max_len` are ignored, so the result never has more
/// than `max_len` entries. Indices that were skipped come out as `null`.
/// Other form fields are ignored. A repeated key keeps its last value.
pub fn parse_info_form(pairs: &[(String, String)], max_len: usize) -> Vec<Value> {
    let mut edits: Vec<Option<Map<String, Value>>> = Vec::new();
    for (name, value) in pairs {
        let Some((index, key)) = info_key(name) else {
            continue;
        };
        if index >= max_len {
            continue;
        }
        if edits.len() <= index {
            edits.resize(index + 1, None);
        }
        edits[index]
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), Value::String(value.clone()));
    }
    edits
        .into_iter()
        .map(|edit| edit.map_or(Value::Null, Value::Object))
        .collect()
}
