//! TTL-governed, atomically swapped catalog snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use concierge_core::types::{CacheSnapshot, CourseRecord, KnowledgeBaseText, Locale};

use crate::error::{FetchError, Result};
use crate::gateway::CatalogGateway;

/// What a call to [`RefreshableCache::ensure_fresh`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was within its TTL; nothing was fetched.
    AlreadyFresh,
    /// A new snapshot was installed.
    Refreshed { generation: u64 },
}

/// Holds the current [`CacheSnapshot`] and refreshes it on demand.
///
/// Readers call [`get`](Self::get) and receive an `Arc` to a complete
/// snapshot; they never wait on the network. Refreshes build a new snapshot
/// off to the side and swap the pointer only when every part was fetched.
///
/// Concurrent refresh requests are coalesced through an async gate: a caller
/// that queued while another refresh was in flight receives that refresh's
/// result instead of fetching again.
pub struct RefreshableCache {
    gateway: Arc<dyn CatalogGateway>,
    ttl: chrono::Duration,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    /// Serializes refreshes and remembers the last attempt's result.
    gate: Mutex<Option<Result<RefreshOutcome>>>,
    /// Number of completed refresh attempts.
    attempts: AtomicU64,
}

impl RefreshableCache {
    pub fn new(gateway: Arc<dyn CatalogGateway>, ttl: chrono::Duration) -> Self {
        Self {
            gateway,
            ttl,
            snapshot: RwLock::new(Arc::new(CacheSnapshot::unpopulated())),
            gate: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    /// Perform the mandatory first population.
    ///
    /// Fails when the fetch fails or when the result carries no courses and
    /// no knowledge text for any locale. The caller treats either as fatal.
    pub async fn initialize(&self) -> Result<Arc<CacheSnapshot>> {
        let mut last = self.gate.lock().await;
        let result = self.refresh_locked(&mut last).await;
        result?;

        let snapshot = self.get();
        if snapshot.is_empty() {
            return Err(FetchError::EmptyCatalog);
        }
        Ok(snapshot)
    }

    /// The current snapshot, possibly stale.
    pub fn get(&self) -> Arc<CacheSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when the current snapshot is older than the TTL or was never
    /// populated.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let snapshot = self.get();
        snapshot.generation == 0 || snapshot.age(now) > self.ttl
    }

    /// Refresh the snapshot if it is stale.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// returned. Callers that were waiting on an in-flight refresh get that
    /// refresh's result.
    pub async fn ensure_fresh(&self) -> Result<RefreshOutcome> {
        let seen = self.attempts.load(Ordering::Acquire);
        let mut last = self.gate.lock().await;

        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(result) = last.as_ref() {
                debug!("joined in-flight catalog refresh");
                return result.clone();
            }
        }

        if !self.is_stale(Utc::now()) {
            return Ok(RefreshOutcome::AlreadyFresh);
        }

        self.refresh_locked(&mut last).await
    }

    /// Start the background tick that keeps the snapshot fresh.
    ///
    /// The first tick is skipped; [`initialize`](Self::initialize) has just run.
    pub fn spawn_refresh_loop(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "Catalog refresh loop started");
            let mut interval = tokio::time::interval(period);
            interval.tick().await;

            loop {
                interval.tick().await;
                match self.ensure_fresh().await {
                    Ok(RefreshOutcome::Refreshed { generation }) => {
                        debug!(generation, "Scheduled catalog refresh installed a new snapshot");
                    }
                    Ok(RefreshOutcome::AlreadyFresh) => {}
                    Err(e) => {
                        let snapshot = self.get();
                        warn!(
                            error = %e,
                            generation = snapshot.generation,
                            age_secs = snapshot.age(Utc::now()).num_seconds(),
                            "Catalog refresh failed, serving stale snapshot"
                        );
                    }
                }
            }
        })
    }

    /// Fetch and install a new snapshot. Must be called with the gate held.
    async fn refresh_locked(
        &self,
        last: &mut Option<Result<RefreshOutcome>>,
    ) -> Result<RefreshOutcome> {
        let result = self.fetch_snapshot().await.map(|snapshot| {
            let generation = snapshot.generation;
            *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
            RefreshOutcome::Refreshed { generation }
        });

        match &result {
            Ok(RefreshOutcome::Refreshed { generation }) => {
                info!(generation, "Catalog snapshot refreshed")
            }
            Ok(RefreshOutcome::AlreadyFresh) => {}
            Err(e) => warn!(error = %e, "Catalog fetch failed"),
        }

        *last = Some(result.clone());
        self.attempts.fetch_add(1, Ordering::Release);
        result
    }

    /// Build a complete snapshot from the gateway. Any failing part fails the
    /// whole fetch.
    async fn fetch_snapshot(&self) -> Result<CacheSnapshot> {
        let previous = self.get();

        let rows = self.gateway.fetch_courses().await?;
        let mut snapshot = CacheSnapshot::unpopulated();

        for locale in Locale::ALL {
            let courses: Vec<CourseRecord> = rows
                .iter()
                .filter_map(|row| CourseRecord::from_row(row, locale))
                .collect();
            debug!(locale = %locale, courses = courses.len(), "courses parsed");
            snapshot.courses.insert(locale, courses);

            let text = self.gateway.fetch_knowledge(locale).await?;
            snapshot.knowledge.insert(locale, KnowledgeBaseText(text));
        }

        snapshot.fetched_at = Utc::now().max(previous.fetched_at);
        snapshot.generation = previous.generation + 1;
        Ok(snapshot)
    }
}
