//! Configuration constants.
//!
//! This module defines the constants shared by the export pipeline, the
//! dictionary editor and the server defaults.

/// Maximum number of rows requested from the backing store in one call.
///
/// Exports larger than this are served as a sequence of pages; memory per
/// request stays bounded by one page plus one output chunk.
pub const PAGINATE_BY: u64 = 32_000;

/// Column ids starting with this prefix are managed by the store itself.
/// They are exported but never offered for editing in the data dictionary.
pub const SYSTEM_COLUMN_PREFIX: &str = "_";

/// UTF-8 byte order mark, written first when the client asks for `bom=true`.
pub const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Number of output chunks buffered between an export task and the response body.
pub const EXPORT_CHANNEL_CAPACITY: usize = 16;

/// Output is handed to the response body once this many bytes have accumulated.
pub const EXPORT_CHUNK_BYTES: usize = 16 * 1024;

/// Default SQLite database path.
pub const DEFAULT_DB_PATH: &str = "./datastore.db";

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 5050;

/// Maximum number of pooled SQLite connections.
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// Header row of the data dictionary CSV download.
pub const DICTIONARY_CSV_HEADER: [&str; 4] = ["column", "type", "label", "description"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_is_utf8_signature() {
        assert_eq!(UTF8_BOM, "\u{feff}".as_bytes());
    }

    #[test]
    fn test_chunk_size_is_nonzero() {
        // A zero threshold would flush after every byte
        assert!(EXPORT_CHUNK_BYTES > 0);
        assert!(EXPORT_CHANNEL_CAPACITY > 0);
    }
}
