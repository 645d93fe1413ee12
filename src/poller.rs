//! Periodic poll driver
//!
//! Invokes one coordinator refresh per interval tick and retains the
//! last successfully fetched record set. A failed cycle logs one
//! uniform "update failed" event and keeps the previous snapshot, so
//! consumers see stale-but-valid data rather than nothing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::coordinator::overrides::display_value;
use crate::coordinator::record::TaskRecord;
use crate::coordinator::TaskCoordinator;

/// Drives periodic refresh cycles against one coordinator
#[derive(Debug)]
pub struct Poller {
    coordinator: Arc<TaskCoordinator>,
    interval: Duration,
    snapshot: RwLock<Vec<TaskRecord>>,
}

impl Poller {
    /// Create a driver polling on the given interval
    pub fn new(coordinator: Arc<TaskCoordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Last successfully fetched record set (empty before the first
    /// successful cycle)
    pub async fn latest(&self) -> Vec<TaskRecord> {
        self.snapshot.read().await.clone()
    }

    /// Run the poll loop forever
    ///
    /// The first cycle starts immediately; a cycle that overruns the
    /// interval delays the next tick instead of bursting. Cycles are
    /// additionally serialized inside the coordinator, so an in-flight
    /// cycle always runs to completion before the next one starts.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// Run one poll step: refresh and replace the snapshot on success
    ///
    /// A failed cycle logs one uniform "update failed" event and leaves
    /// the previous snapshot untouched.
    pub async fn run_once(&self) {
        match self.coordinator.refresh().await {
            Ok(records) => {
                info!(count = records.len(), "task records refreshed");
                for rec in &records {
                    for (key, value) in &rec.fields {
                        debug!(
                            task = %rec.name,
                            key,
                            value = %display_value(key, value),
                            "merged field"
                        );
                    }
                }
                *self.snapshot.write().await = records;
            }
            Err(err) => {
                warn!(%err, "task data update failed, keeping previous records");
            }
        }
    }
}
