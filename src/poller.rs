// src/poller.rs

//! Background poller.
//!
//! Wakes on a fixed period and refreshes the cache through the same owned
//! path the query facade uses. A tick that finds a refresh already in flight
//! is a no-op, so a slow fetch never piles up overlapping work.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::models::FreshnessConfig;
use crate::services::DataService;

/// Periodic refresh task over a shared [`DataService`].
pub struct Poller {
    service: Arc<DataService>,
    period: std::time::Duration,
}

impl Poller {
    pub fn new(service: Arc<DataService>, config: &FreshnessConfig) -> Self {
        Self {
            service,
            period: std::time::Duration::from_secs(config.poll_interval_secs),
        }
    }

    /// Run the poll loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Poll until the task is aborted.
    pub async fn run(self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("poller started with period {:?}", self.period);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// One poll tick. Failures are absorbed here; they are recorded in the
    /// cache for the health signal and never propagate outward.
    async fn tick(&self) {
        if !self.service.try_begin_refresh() {
            log::debug!("refresh already in flight, skipping tick");
            return;
        }

        if let Err(error) = self.service.refresh_owned().await {
            log::warn!("poll refresh failed: {error}");
        }
    }
}
