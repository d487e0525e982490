//! Query façade over fetching, extraction and aggregation
//!
//! [`StatusEngine`] validates a (release, language) query, serves it from the
//! result cache when fresh, and otherwise runs one shared refresh per key.

mod cache;
mod engine;
mod pipeline;
mod single_flight;
mod types;

pub use cache::{is_fresh, CacheEntry, StatusCache};
pub use engine::*;
pub use pipeline::{fetch_all, Paging};
pub use types::*;
