//! Shared helpers.

mod http;
mod markup;

pub use http::{attachment, encode_path};
pub use markup::escape_markup;
