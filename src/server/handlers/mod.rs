//! HTTP handlers.

mod dictionary;
mod export;
mod health;

pub use dictionary::{dictionary_download_handler, dictionary_handler, dictionary_save_handler};
pub use export::export_handler;
pub use health::health_handler;
