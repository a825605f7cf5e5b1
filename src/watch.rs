//! Offer Watcher
//!
//! Periodic offer reconciliation with a shared snapshot. Fetches are stamped
//! with a generation counter so overlapping refreshes can never publish out
//! of order: the last-completed fetch wins, and a stopped watcher abandons
//! in-flight results instead of writing them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::SwapError;
use crate::service::SwapService;
use crate::state::Offer;

struct Snapshot {
    generation: u64,
    offers: Vec<Offer>,
}

/// Periodically refreshed view of the live offer list.
pub struct OfferWatcher {
    service: Arc<SwapService>,
    snapshot: RwLock<Snapshot>,
    next_generation: AtomicU64,
    stopped: AtomicBool,
    interval: Duration,
}

impl OfferWatcher {
    /// Creates a watcher around a service with the given polling interval.
    pub fn new(service: Arc<SwapService>, interval: Duration) -> Self {
        Self {
            service,
            snapshot: RwLock::new(Snapshot {
                generation: 0,
                offers: Vec::new(),
            }),
            next_generation: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            interval,
        }
    }

    /// The latest published offer list.
    pub async fn offers(&self) -> Vec<Offer> {
        self.snapshot.read().await.offers.clone()
    }

    /// Stops the polling loop and abandons any in-flight fetch.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Runs one fetch and publishes it if it is still the newest.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Snapshot updated
    /// * `Ok(false)` - Result abandoned (stopped, or a newer fetch already
    ///   published)
    /// * `Err(SwapError)` - The fetch itself failed
    pub async fn refresh(&self) -> Result<bool, SwapError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let offers = self.service.list_offers().await?;

        if self.is_stopped() {
            return Ok(false);
        }

        let mut snapshot = self.snapshot.write().await;
        if generation <= snapshot.generation {
            // A newer fetch already published; this result is stale.
            return Ok(false);
        }
        snapshot.generation = generation;
        snapshot.offers = offers;
        Ok(true)
    }

    /// Polling loop: refreshes on the configured interval until stopped.
    /// Fetch failures are logged and the loop keeps going; the next tick is
    /// the retry.
    pub async fn run(self: Arc<Self>) {
        info!("offer watcher started, interval {:?}", self.interval);
        while !self.is_stopped() {
            match self.refresh().await {
                Ok(true) => {}
                Ok(false) => info!("offer refresh abandoned (stale or stopped)"),
                Err(e) => warn!("offer refresh failed: {}", e),
            }
            tokio::time::sleep(self.interval).await;
        }
        info!("offer watcher stopped");
    }
}
