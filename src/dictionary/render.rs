//! HTML page of the data dictionary editor.

use std::fmt::Write as _;

use crate::storage::{Column, ResourceMeta};
use crate::utils::{encode_path, escape_markup};

/// Editable info keys, in form order, with their input labels.
const INFO_INPUTS: [(&str, &str); 3] = [
    ("label", "Label"),
    ("notes", "Description"),
    ("type_override", "Type override"),
];

/// Path of the editor page for a resource, each segment percent-encoded.
pub fn editor_path(package_id: &str, resource_id: &str) -> String {
    encode_path(&["dictionary", package_id, resource_id])
}

/// Path of the dictionary CSV download for a resource.
pub fn download_path(resource_id: &str) -> String {
    encode_path(&["dictionary", resource_id, "download"])
}

/// Renders the editor for `columns`, posting back to the same path.
///
/// Input `i` of each column is named `info__<i>__<key>`.
pub fn render_editor(meta: &ResourceMeta, columns: &[Column]) -> String {
    let title = escape_markup(if meta.name.is_empty() {
        &meta.resource_id
    } else {
        &meta.name
    });
    let action = editor_path(&meta.package_id, &meta.resource_id);
    let download = download_path(&meta.resource_id);

    let mut html = String::with_capacity(1024 + columns.len() * 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Data Dictionary: {title}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>Data Dictionary: {title}</h1>");
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}\">",
        escape_markup(&action)
    );

    for (index, column) in columns.iter().enumerate() {
        html.push_str("<fieldset>\n");
        let _ = writeln!(
            html,
            "<legend>{} ({})</legend>",
            escape_markup(&column.id),
            escape_markup(&column.column_type)
        );
        for (key, label) in INFO_INPUTS {
            let name = format!("info__{index}__{key}");
            let value = column.info_text(key);
            let _ = writeln!(
                html,
                "<label for=\"{name}\">{label}</label> \
                 <input id=\"{name}\" name=\"{name}\" value=\"{}\">",
                escape_markup(&value)
            );
        }
        html.push_str("</fieldset>\n");
    }

    html.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    let _ = writeln!(
        html,
        "<p><a href=\"{}\">Download data dictionary</a></p>",
        escape_markup(&download)
    );
    html.push_str("</body>\n</html>\n");
    html
}
