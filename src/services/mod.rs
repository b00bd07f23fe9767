// src/services/mod.rs

//! Fetch, parse, and query services around the freshness cache.

pub mod data;
pub mod fetch;
pub mod parse;

pub use data::DataService;
pub use fetch::{FetchContent, RawContent, SourceFetcher};
pub use parse::parse_snapshot;
