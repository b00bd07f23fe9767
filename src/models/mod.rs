// src/models/mod.rs

//! Domain models for the data service.

mod config;
mod snapshot;

// Re-export all public types
pub use config::{BotConfig, Config, FreshnessConfig, LoggingConfig, SourcesConfig};
pub use snapshot::{Character, Event, Snapshot};
