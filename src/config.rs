// src/config.rs

//! Configuration loading utilities.

use std::env;
use std::path::Path;

use crate::models::Config;

/// Env var overriding the fallback API key from the config file.
pub const FALLBACK_API_KEY_ENV: &str = "FFWATCH_FALLBACK_API_KEY";

/// Load configuration from a TOML file, falling back to defaults, and apply
/// environment overrides.
///
/// Credentials are expected from the environment in deployments; the config
/// file value is only a development convenience.
pub fn load(path: impl AsRef<Path>) -> Config {
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config);
    config
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = env::var(FALLBACK_API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.sources.fallback_api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = load("/nonexistent/ffwatch.toml");
        assert_eq!(config.freshness.poll_interval_secs, 30);
    }
}
