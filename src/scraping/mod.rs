//! Fetching and reading Launchpad translation pages
//!
//! - `FetchEngine`: HTTP fetching with retries, behind the `PageSource` trait
//! - `extractor`: status table rows from raw HTML

pub mod extractor;
pub mod fetcher;

pub use extractor::{extract, Extraction, ParseError, RawRecord};
pub use fetcher::{FetchConfig, FetchEngine, FetchError, PageSource, RawPage};
