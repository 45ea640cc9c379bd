// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic deal polling.
//!
//! Each successful cycle replaces the deal list wholesale. A failed cycle
//! keeps the previous list and records the error.

use crate::models::{ConfigState, DealItem};
use crate::services::deals::DealService;
use crate::store::ConfigStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Latest poll result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DealSnapshot {
    pub deals: Vec<DealItem>,
    /// Time of the last successful poll
    pub last_updated: Option<DateTime<Utc>>,
    /// Error from the most recent poll, cleared on success
    pub error: Option<String>,
}

/// Shortest allowed time between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runs [`DealService::fetch_deals`] on a fixed interval.
pub struct Poller {
    deals: DealService,
    interval: Duration,
}

impl Poller {
    pub fn new(deals: DealService, interval: Duration) -> Self {
        Self {
            deals,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single poll cycle against `snapshot`. Returns true on success.
    pub async fn poll_once(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
        snapshot: &mut DealSnapshot,
    ) -> bool {
        match self.deals.fetch_deals(store, state).await {
            Ok(deals) => {
                snapshot.deals = deals;
                snapshot.last_updated = Some(Utc::now());
                snapshot.error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Deal poll failed");
                snapshot.error = Some(e.to_string());
                false
            }
        }
    }

    /// Poll until `shutdown` resolves, calling `on_update` after every cycle.
    ///
    /// The first cycle runs immediately. Returns the final snapshot.
    pub async fn run<S, F>(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
        shutdown: S,
        mut on_update: F,
    ) -> DealSnapshot
    where
        S: Future<Output = ()>,
        F: FnMut(&DealSnapshot),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut snapshot = DealSnapshot::default();
        tracing::info!(interval_secs = self.interval.as_secs(), "Poll loop started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Poll loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll_once(store, state, &mut snapshot).await;
                    on_update(&snapshot);
                }
            }
        }

        snapshot
    }
}
