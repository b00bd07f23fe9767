// src/services/data.rs

//! Query facade over the freshness cache.
//!
//! Command handlers call [`DataService::get_current`] and never touch the
//! network themselves. Reads only hit the network when the cache is stale and
//! no other refresh is running; concurrent callers get the stale snapshot
//! instead of a second fetch.

use std::sync::Arc;

use chrono::Duration;

use crate::cache::{CacheHealth, FailureKind, FreshnessCache, RefreshOutcome};
use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::{FreshnessConfig, Snapshot};
use crate::services::fetch::FetchContent;
use crate::services::parse::parse_snapshot;

/// Facade used by the command layer and the poller.
pub struct DataService {
    cache: Arc<FreshnessCache>,
    fetcher: Arc<dyn FetchContent>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl DataService {
    pub fn new(
        cache: Arc<FreshnessCache>,
        fetcher: Arc<dyn FetchContent>,
        clock: Arc<dyn Clock>,
        config: &FreshnessConfig,
    ) -> Self {
        Self {
            cache,
            fetcher,
            clock,
            max_age: Duration::seconds(config.cache_timeout_secs as i64),
        }
    }

    /// Current snapshot with the configured staleness window.
    pub async fn latest(&self) -> Result<Snapshot> {
        self.get_current(self.max_age).await
    }

    /// Current snapshot, refreshing first if the cache is older than
    /// `max_age` and no refresh is already running.
    ///
    /// With a populated cache this never fails: a refresh error is recorded
    /// and the previous snapshot is returned. On a cold cache the caller
    /// either owns the populating refresh (and gets its failure as
    /// [`AppError::EmptyCache`]) or waits for the owner to finish.
    pub async fn get_current(&self, max_age: Duration) -> Result<Snapshot> {
        if let Some(snapshot) = self.cache.read() {
            let now = self.clock.now();
            if !self.cache.is_stale(now, max_age) {
                return Ok(snapshot);
            }

            if self.cache.try_begin_refresh() {
                if let Err(error) = self.refresh_owned().await {
                    log::warn!("refresh failed, serving previous snapshot: {error}");
                }
                return Ok(self.cache.read().unwrap_or(snapshot));
            }

            // Another refresh is in flight: stale beats added latency
            return Ok(snapshot);
        }

        self.populate_cold().await
    }

    /// Cold-start path: become the refresh owner or wait for the owner.
    async fn populate_cold(&self) -> Result<Snapshot> {
        loop {
            // Register for completion before re-checking, so a commit between
            // the check and the await cannot be missed.
            let completed = self.cache.refresh_completed();

            if let Some(snapshot) = self.cache.read() {
                return Ok(snapshot);
            }

            if self.cache.try_begin_refresh() {
                self.refresh_owned()
                    .await
                    .map_err(|e| AppError::empty_cache(e.to_string()))?;
                return self.cache.read().ok_or_else(|| {
                    AppError::empty_cache("cold-start refresh produced no snapshot")
                });
            }

            // The owner may have failed; loop and possibly take over.
            completed.await;
        }
    }

    /// Run one fetch → parse → commit cycle.
    ///
    /// The caller must have won [`FreshnessCache::try_begin_refresh`]; every
    /// path through here commits, so the in-flight flag never leaks.
    pub async fn refresh_owned(&self) -> Result<()> {
        let result = match self.fetcher.fetch().await {
            Ok(raw) => match parse_snapshot(&raw, self.clock.now()) {
                Ok(snapshot) => Ok(snapshot),
                Err(e) => Err((FailureKind::from(&e), AppError::from(e))),
            },
            Err(e) => Err((FailureKind::from(&e), AppError::from(e))),
        };

        let now = self.clock.now();
        match result {
            Ok(snapshot) => {
                let replaced = self.cache.commit(RefreshOutcome::Fetched(snapshot), now);
                if replaced {
                    log::info!("source content changed, snapshot replaced");
                } else {
                    log::debug!("source content unchanged");
                }
                Ok(())
            }
            Err((kind, error)) => {
                self.cache.commit(RefreshOutcome::Failed(kind), now);
                Err(error)
            }
        }
    }

    /// Claim the refresh slot; see [`FreshnessCache::try_begin_refresh`].
    pub fn try_begin_refresh(&self) -> bool {
        self.cache.try_begin_refresh()
    }

    /// Health signal for a collaborator's health endpoint.
    pub fn health(&self) -> CacheHealth {
        self.cache.health(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::test::ManualClock;
    use crate::error::FetchError;
    use crate::services::fetch::RawContent;

    /// Fetcher that serves a queue of canned responses.
    struct StubFetcher {
        responses: Mutex<VecDeque<std::result::Result<String, FetchError>>>,
        calls: AtomicUsize,
        delay_ms: u64,
    }

    impl StubFetcher {
        fn new(responses: Vec<std::result::Result<String, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                delay_ms: 0,
            }
        }

        fn with_delay(mut self, delay_ms: u64) -> Self {
            self.delay_ms = delay_ms;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FetchContent for StubFetcher {
        async fn fetch(&self) -> std::result::Result<RawContent, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(body)) => Ok(RawContent {
                    body,
                    source: "stub".to_string(),
                }),
                Some(Err(error)) => Err(error),
                None => Err(FetchError::Unreachable("stub exhausted".to_string())),
            }
        }
    }

    fn service(
        responses: Vec<std::result::Result<String, FetchError>>,
        delay_ms: u64,
    ) -> (DataService, Arc<StubFetcher>, Arc<ManualClock>) {
        let fetcher = Arc::new(StubFetcher::new(responses).with_delay(delay_ms));
        let clock = Arc::new(ManualClock::new(
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        ));
        let cache = Arc::new(FreshnessCache::new());
        let service = DataService::new(
            cache,
            Arc::clone(&fetcher) as Arc<dyn FetchContent>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            &FreshnessConfig::default(),
        );
        (service, fetcher, clock)
    }

    fn body(version: &str) -> std::result::Result<String, FetchError> {
        Ok(format!(r#"{{"version": "{version}"}}"#))
    }

    #[tokio::test]
    async fn test_cold_start_success_populates_cache() {
        let (service, fetcher, _clock) = service(vec![body("OB50")], 0);

        let snapshot = service.latest().await.unwrap();
        assert_eq!(snapshot.version, "OB50");
        assert_eq!(fetcher.calls(), 1);

        let health = service.health();
        assert!(health.has_snapshot);
        assert!(!health.refresh_in_flight);
    }

    #[tokio::test]
    async fn test_cold_start_failure_signals_empty_cache() {
        let (service, fetcher, _clock) = service(
            vec![Err(FetchError::Timeout("primary".to_string()))],
            0,
        );

        let result = service.latest().await;
        assert!(matches!(result, Err(AppError::EmptyCache(_))));
        assert_eq!(fetcher.calls(), 1);

        let health = service.health();
        assert!(!health.has_snapshot);
        assert!(!health.refresh_in_flight);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_served_without_fetch() {
        let (service, fetcher, clock) = service(vec![body("OB50")], 0);

        let first = service.latest().await.unwrap();
        clock.advance(Duration::seconds(30));

        let second = service.latest().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_read_with_unchanged_content_keeps_snapshot() {
        let (service, fetcher, clock) = service(vec![body("OB50"), body("OB50")], 0);

        let first = service.latest().await.unwrap();
        clock.advance(Duration::seconds(61));

        let second = service.latest().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        // Same fingerprint: same snapshot object, only last_checked_at moved
        assert_eq!(first.fetched_at, second.fetched_at);
        assert_eq!(service.health().last_checked_age_secs, Some(0));
    }

    #[tokio::test]
    async fn test_stale_read_with_changed_content_replaces_snapshot() {
        let (service, _fetcher, clock) = service(vec![body("OB50"), body("OB51")], 0);

        let first = service.latest().await.unwrap();
        clock.advance(Duration::seconds(61));

        let second = service.latest().await.unwrap();
        assert_eq!(first.version, "OB50");
        assert_eq!(second.version, "OB51");
        assert!(second.fetched_at > first.fetched_at);
    }

    #[tokio::test]
    async fn test_refresh_failure_serves_stale_snapshot() {
        let (service, _fetcher, clock) = service(
            vec![
                body("OB50"),
                Err(FetchError::Unreachable("down".to_string())),
            ],
            0,
        );

        let first = service.latest().await.unwrap();
        clock.advance(Duration::seconds(61));

        let second = service.latest().await.unwrap();
        assert_eq!(first, second);
        assert!(service.health().last_failure.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_stale_reads_fetch_once() {
        let (service, fetcher, clock) = service(vec![body("OB50"), body("OB51")], 50);

        service.latest().await.unwrap();
        assert_eq!(fetcher.calls(), 1);
        clock.advance(Duration::seconds(61));

        let (a, b) = tokio::join!(service.latest(), service.latest());
        // Exactly one caller performed the fetch; the other got the stale
        // snapshot immediately.
        assert_eq!(fetcher.calls(), 2);
        let versions = [a.unwrap().version, b.unwrap().version];
        assert!(versions.contains(&"OB51".to_string()));
        assert!(versions.contains(&"OB50".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_cold_start_single_fetch() {
        let (service, fetcher, _clock) = service(vec![body("OB50")], 50);

        let (a, b) = tokio::join!(service.latest(), service.latest());
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.unwrap().version, "OB50");
        assert_eq!(b.unwrap().version, "OB50");
    }

    #[tokio::test]
    async fn test_cold_start_waiter_takes_over_after_owner_failure() {
        let (service, fetcher, _clock) = service(
            vec![
                Err(FetchError::Unreachable("down".to_string())),
                body("OB50"),
            ],
            50,
        );

        let (a, b) = tokio::join!(service.latest(), service.latest());
        // Owner failed, waiter retried and succeeded
        assert_eq!(fetcher.calls(), 2);
        let results = [a, b];
        assert!(results.iter().any(|r| r.is_err()));
        assert!(
            results
                .iter()
                .any(|r| r.as_ref().is_ok_and(|s| s.version == "OB50"))
        );
    }
}
