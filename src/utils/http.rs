//! Building URL paths and header values from resource identifiers.

use url::Url;

/// Absolute path made of `segments`, each percent-encoded on its own.
///
/// `/`, `?`, `#`, `%` and spaces inside a segment are encoded, so the path
/// routes back to the same identifiers once decoded.
pub fn encode_path(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return String::from("/");
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// `attachment; filename="..."` with `"` and `\` escaped as a quoted-string.
pub fn attachment(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len() + 2);
    for c in filename.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("attachment; filename=\"{quoted}\"")
}
