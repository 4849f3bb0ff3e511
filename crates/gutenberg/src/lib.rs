pub mod cache;
pub mod cleaner;
pub mod client;
pub mod fetched;
pub mod metadata;

pub use cache::{CacheStats, TextCache};
pub use cleaner::clean_book_text;
pub use client::{BookSource, GutenbergClient, GutenbergConfig};
pub use fetched::Fetched;
pub use metadata::{BookMetadata, parse_metadata};
