// src/services/fetch.rs

//! Source fetcher.
//!
//! Performs one HTTP GET against an ordered list of sources: the primary
//! page first, then the fallback API endpoint. There is no retry loop beyond
//! that single pass; the poller's next tick is the retry mechanism.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{FetchError, Result};
use crate::models::SourcesConfig;

/// Raw content returned by a source, before parsing.
#[derive(Debug, Clone)]
pub struct RawContent {
    /// Response body (HTML from the primary page, JSON from the fallback API)
    pub body: String,

    /// URL of the source that answered
    pub source: String,
}

/// Seam between the refresh path and the network.
///
/// Implemented by [`SourceFetcher`] in production and by stubs in tests.
#[async_trait]
pub trait FetchContent: Send + Sync {
    async fn fetch(&self) -> std::result::Result<RawContent, FetchError>;
}

/// A single source attempt: URL plus optional bearer credentials.
#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    pub url: String,
    pub api_key: Option<String>,
}

/// HTTP fetcher over an ordered source list.
pub struct SourceFetcher {
    client: Client,
    sources: Vec<SourceEndpoint>,
}

impl SourceFetcher {
    /// Build a fetcher from the source configuration.
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        let mut sources = vec![SourceEndpoint {
            url: config.primary_url.clone(),
            api_key: None,
        }];
        if let Some(fallback) = &config.fallback_url {
            sources.push(SourceEndpoint {
                url: fallback.clone(),
                api_key: config.fallback_api_key.clone(),
            });
        }

        Ok(Self { client, sources })
    }

    /// The configured source attempt order.
    pub fn sources(&self) -> &[SourceEndpoint] {
        &self.sources
    }

    async fn fetch_one(
        &self,
        endpoint: &SourceEndpoint,
    ) -> std::result::Result<RawContent, FetchError> {
        let mut request = self.client.get(&endpoint.url);
        if let Some(key) = &endpoint.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify(e, &endpoint.url))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::AuthFailed(format!(
                "{} returned {}",
                endpoint.url, status
            )));
        }
        if !status.is_success() {
            return Err(FetchError::Unreachable(format!(
                "{} returned {}",
                endpoint.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, &endpoint.url))?;

        Ok(RawContent {
            body,
            source: endpoint.url.clone(),
        })
    }
}

#[async_trait]
impl FetchContent for SourceFetcher {
    /// Try each source in order, returning the first success.
    ///
    /// On total failure, the error of the last attempt is surfaced.
    async fn fetch(&self) -> std::result::Result<RawContent, FetchError> {
        let mut last_error = FetchError::Unreachable("no sources configured".to_string());

        for endpoint in &self.sources {
            match self.fetch_one(endpoint).await {
                Ok(raw) => {
                    log::debug!("fetched {} bytes from {}", raw.body.len(), raw.source);
                    return Ok(raw);
                }
                Err(error) => {
                    log::warn!("source {} failed: {}", endpoint.url, error);
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }
}

fn classify(error: reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(format!("{url}: {error}"))
    } else {
        FetchError::Unreachable(format!("{url}: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourcesConfig;

    #[test]
    fn test_primary_only_when_no_fallback() {
        let config = SourcesConfig::default();
        let fetcher = SourceFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.sources().len(), 1);
        assert_eq!(fetcher.sources()[0].url, config.primary_url);
        assert!(fetcher.sources()[0].api_key.is_none());
    }

    #[test]
    fn test_fallback_appended_with_key() {
        let config = SourcesConfig {
            fallback_url: Some("https://api.example.com/freefire".to_string()),
            fallback_api_key: Some("secret".to_string()),
            ..SourcesConfig::default()
        };
        let fetcher = SourceFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.sources().len(), 2);
        assert_eq!(
            fetcher.sources()[1].api_key.as_deref(),
            Some("secret")
        );
    }
}
