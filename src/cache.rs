// src/cache.rs

//! Freshness cache: the single shared mutable state of the process.
//!
//! Holds the last known [`Snapshot`], the time of the last source check, and
//! the in-flight refresh flag. All operations take the lock briefly and never
//! await while holding it, so `try_begin_refresh` is a true test-and-set
//! between concurrent callers.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::sync::futures::Notified;

use crate::error::{FetchError, ParseError};
use crate::models::Snapshot;

/// What a completed refresh produced.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Fetch and parse succeeded; fingerprint comparison happens in `commit`
    Fetched(Snapshot),
    /// Fetch or parse failed; the cache keeps its previous snapshot
    Failed(FailureKind),
}

/// The kind of the most recent refresh failure, kept for the health signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unreachable,
    Timeout,
    AuthFailed,
    MalformedContent,
}

impl From<&FetchError> for FailureKind {
    fn from(e: &FetchError) -> Self {
        match e {
            FetchError::Unreachable(_) => FailureKind::Unreachable,
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::AuthFailed(_) => FailureKind::AuthFailed,
        }
    }
}

impl From<&ParseError> for FailureKind {
    fn from(e: &ParseError) -> Self {
        match e {
            ParseError::MalformedContent(_) => FailureKind::MalformedContent,
        }
    }
}

/// Health signal for a collaborator's health-check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    /// Whether any snapshot has ever been fetched
    pub has_snapshot: bool,

    /// Version tag of the current snapshot, if any
    pub version: Option<String>,

    /// Seconds since the source was last checked, `None` before first check
    pub last_checked_age_secs: Option<i64>,

    /// Kind of the most recent refresh failure, cleared on success
    pub last_failure: Option<FailureKind>,

    /// Whether a refresh is currently running
    pub refresh_in_flight: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    snapshot: Option<Snapshot>,
    last_checked_at: Option<DateTime<Utc>>,
    refresh_in_flight: bool,
    last_failure: Option<FailureKind>,
}

/// Process-wide snapshot cache with get-or-refresh semantics.
///
/// Constructed once at the composition point and shared via `Arc` between the
/// poller and the query facade.
#[derive(Debug, Default)]
pub struct FreshnessCache {
    state: Mutex<CacheState>,
    refresh_done: Notify,
}

impl FreshnessCache {
    /// Create an empty cache (cold start).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any. Never blocks on I/O.
    pub fn read(&self) -> Option<Snapshot> {
        self.state.lock().unwrap().snapshot.clone()
    }

    /// Atomically claim the refresh slot.
    ///
    /// Returns `true` when the caller now owns the refresh and must call
    /// [`commit`](Self::commit) exactly once; `false` when another refresh is
    /// already running.
    pub fn try_begin_refresh(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.refresh_in_flight {
            return false;
        }
        state.refresh_in_flight = true;
        true
    }

    /// Complete an owned refresh.
    ///
    /// Replaces the snapshot only when the fingerprint differs from the
    /// current one; always updates `last_checked_at`, clears the in-flight
    /// flag, and wakes cold-start waiters. Returns `true` when the snapshot
    /// was replaced.
    pub fn commit(&self, outcome: RefreshOutcome, now: DateTime<Utc>) -> bool {
        let replaced = {
            let mut state = self.state.lock().unwrap();

            let replaced = match outcome {
                RefreshOutcome::Fetched(mut snapshot) => {
                    state.last_failure = None;
                    let changed = state
                        .snapshot
                        .as_ref()
                        .is_none_or(|cur| cur.source_fingerprint != snapshot.source_fingerprint);
                    if changed {
                        // fetched_at must never go backwards across replacements
                        if let Some(cur) = &state.snapshot {
                            snapshot.fetched_at = snapshot.fetched_at.max(cur.fetched_at);
                        }
                        state.snapshot = Some(snapshot);
                    }
                    changed
                }
                RefreshOutcome::Failed(kind) => {
                    state.last_failure = Some(kind);
                    false
                }
            };

            state.last_checked_at = Some(now);
            state.refresh_in_flight = false;
            replaced
        };

        self.refresh_done.notify_waiters();
        replaced
    }

    /// Whether the cache is due for a refresh.
    ///
    /// True before the first check, and from the moment the last check is
    /// exactly `timeout` old.
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let state = self.state.lock().unwrap();
        match state.last_checked_at {
            Some(checked) => now - checked >= timeout,
            None => true,
        }
    }

    /// Future that resolves when the next `commit` lands.
    ///
    /// Callers must obtain this *before* re-checking cache state, otherwise a
    /// commit between the check and the await is missed.
    pub fn refresh_completed(&self) -> Notified<'_> {
        self.refresh_done.notified()
    }

    /// Health signal: snapshot presence, last-check age, last failure kind.
    pub fn health(&self, now: DateTime<Utc>) -> CacheHealth {
        let state = self.state.lock().unwrap();
        CacheHealth {
            has_snapshot: state.snapshot.is_some(),
            version: state.snapshot.as_ref().map(|s| s.version.clone()),
            last_checked_age_secs: state
                .last_checked_at
                .map(|checked| (now - checked).num_seconds()),
            last_failure: state.last_failure,
            refresh_in_flight: state.refresh_in_flight,
        }
    }
}
