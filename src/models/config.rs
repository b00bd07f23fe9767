//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Cache and polling behavior settings
    #[serde(default)]
    pub freshness: FreshnessConfig,

    /// Command layer settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.primary_url.trim().is_empty() {
            return Err(AppError::config("sources.primary_url is empty"));
        }
        url::Url::parse(&self.sources.primary_url)?;
        if let Some(fallback) = &self.sources.fallback_url {
            url::Url::parse(fallback)?;
        }
        if self.sources.user_agent.trim().is_empty() {
            return Err(AppError::config("sources.user_agent is empty"));
        }
        if self.sources.fetch_timeout_secs == 0 {
            return Err(AppError::config("sources.fetch_timeout_secs must be > 0"));
        }
        if self.freshness.poll_interval_secs == 0 {
            return Err(AppError::config("freshness.poll_interval_secs must be > 0"));
        }
        if self.freshness.cache_timeout_secs == 0 {
            return Err(AppError::config("freshness.cache_timeout_secs must be > 0"));
        }
        if self.bot.max_message_length == 0 {
            return Err(AppError::config("bot.max_message_length must be > 0"));
        }
        Ok(())
    }
}

/// Upstream source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Primary source page to scrape
    #[serde(default = "defaults::primary_url")]
    pub primary_url: String,

    /// Fallback API endpoint tried when the primary source fails
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Bearer token for the fallback API (env `FFWATCH_FALLBACK_API_KEY`
    /// overrides this at load time)
    #[serde(default)]
    pub fallback_api_key: Option<String>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary_url: defaults::primary_url(),
            fallback_url: None,
            fallback_api_key: None,
            user_agent: defaults::user_agent(),
            fetch_timeout_secs: defaults::fetch_timeout(),
        }
    }
}

/// Cache and polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessConfig {
    /// Background poll period in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Staleness window for reads in seconds
    #[serde(default = "defaults::cache_timeout")]
    pub cache_timeout_secs: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::poll_interval(),
            cache_timeout_secs: defaults::cache_timeout(),
        }
    }
}

/// Command layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot display name used in command text
    #[serde(default = "defaults::bot_name")]
    pub name: String,

    /// Maximum length of a single outgoing message chunk
    #[serde(default = "defaults::max_message_length")]
    pub max_message_length: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: defaults::bot_name(),
            max_message_length: defaults::max_message_length(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn primary_url() -> String {
        "https://ff.garena.com/en".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ffwatch/1.0)".into()
    }
    pub fn fetch_timeout() -> u64 {
        10
    }

    // Freshness defaults
    pub fn poll_interval() -> u64 {
        30
    }
    pub fn cache_timeout() -> u64 {
        60
    }

    // Bot defaults
    pub fn bot_name() -> String {
        "Free Fire Updates Bot".into()
    }
    pub fn max_message_length() -> usize {
        4096
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
