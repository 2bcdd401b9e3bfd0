//! Positional merge of dictionary edits onto the server's column list.

use log::debug;
use serde_json::{Map, Value};

use crate::storage::{Column, ColumnDefinition};

/// Columns offered for editing: every non-system column, in table order.
pub fn editable_columns(columns: Vec<Column>) -> Vec<Column> {
    columns.into_iter().filter(|c| !c.is_system()).collect()
}

/// Builds one definition per server column.
///
/// Position `i` keeps the server's id and type and takes `edits[i]` as its
/// `info` when that entry is a JSON object; a missing or non-object entry
/// yields an empty map. Edits past the last column are dropped.
pub fn merge_dictionary(columns: &[Column], edits: &[Value]) -> Vec<ColumnDefinition> {
    if edits.len() > columns.len() {
        debug!(
            "Dropping {} dictionary edits beyond the {} editable columns",
            edits.len() - columns.len(),
            columns.len()
        );
    }

    columns
        .iter()
        .enumerate()
        .map(|(index, column)| ColumnDefinition {
            id: column.id.clone(),
            column_type: column.column_type.clone(),
            info: match edits.get(index) {
                Some(Value::Object(info)) => info.clone(),
                _ => Map::new(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("a", "int"),
            Column::new("b", "text"),
            Column::new("c", "numeric"),
        ]
    }

    #[test]
    fn test_missing_edits_become_empty_info() {
        let merged = merge_dictionary(
            &columns(),
            &[json!({"label": "A"}), json!({"notes": "bee"})],
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].info.get("label"), Some(&json!("A")));
        assert_eq!(merged[1].info.get("notes"), Some(&json!("bee")));
        assert!(merged[2].info.is_empty());
        assert_eq!(merged[2].id, "c");
        assert_eq!(merged[2].column_type, "numeric");
    }

    #[test]
    fn test_surplus_edits_are_dropped() {
        let edits = vec![json!({}), json!({}), json!({}), json!({"label": "extra"})];
        let merged = merge_dictionary(&columns(), &edits);
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|d| d.info.is_empty()));
    }

    #[test]
    fn test_non_object_edits_become_empty_info() {
        let merged = merge_dictionary(&columns(), &[json!("label"), json!(null), json!([1])]);
        assert!(merged.iter().all(|d| d.info.is_empty()));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let edits = vec![json!({"label": "A", "type_override": "text"})];
        assert_eq!(
            merge_dictionary(&columns(), &edits),
            merge_dictionary(&columns(), &edits)
        );
    }

    #[test]
    fn test_editable_columns_skip_system_columns() {
        let mut all = columns();
        all.insert(0, Column::new("_id", "int"));
        all.push(Column::new("_full_text", "tsvector"));
        let ids: Vec<String> = editable_columns(all).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
