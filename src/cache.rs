//! Time-bounded snapshot of resolved client profiles.
//!
//! The snapshot is recomputed from the full visit log on a cold start or once
//! it outlives its TTL. There is no incremental refresh: every refresh reads
//! and resolves the entire row history, which is the scaling ceiling of the
//! service. Concurrent callers that find the snapshot expired may each
//! trigger a recompute; the last one to finish wins. The snapshot is swapped
//! whole and never mutated in place.
use crate::errors::{AppError, ResultExt};
use crate::models::{CacheStatus, ClientProfile};
use crate::record_store::RecordStore;
use crate::resolution::{resolve_profiles, ResolutionStats};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One computed profile set.
#[derive(Debug)]
pub struct Snapshot {
    /// Newest visit first.
    pub profiles: Vec<ClientProfile>,
    pub stats: ResolutionStats,
    pub computed_at: DateTime<Utc>,
}

pub struct ProfileCache {
    store: Arc<dyn RecordStore>,
    sheet: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl ProfileCache {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sheet: impl Into<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            sheet: sheet.into(),
            ttl,
            clock,
            current: RwLock::new(None),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// An empty snapshot counts as cold, as does one older than the TTL.
    fn is_expired(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> bool {
        if snapshot.profiles.is_empty() {
            return true;
        }
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(snapshot.computed_at) > ttl
    }

    /// Returns the current snapshot, recomputing it first when cold or expired.
    ///
    /// A failed refresh is returned to the caller and leaves the previous
    /// snapshot in place.
    pub async fn get(&self) -> Result<Arc<Snapshot>, AppError> {
        let current = self.current.read().await.clone();
        if let Some(snapshot) = current {
            if !self.is_expired(&snapshot, self.clock.now()) {
                return Ok(snapshot);
            }
            tracing::info!(
                "Client profile snapshot expired (computed at {}), refreshing",
                snapshot.computed_at
            );
        }

        self.refresh().await
    }

    /// Unconditionally recomputes the snapshot from a fresh full read.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, AppError> {
        let rows = self
            .store
            .load_rows(&self.sheet)
            .await
            .with_context(|| format!("Reading sheet '{}'", self.sheet))
            .map_err(|e| {
                tracing::warn!("Client profile refresh failed: {}", e);
                e
            })?;

        let resolution = resolve_profiles(&rows);
        let snapshot = Arc::new(Snapshot {
            profiles: resolution.profiles,
            stats: resolution.stats,
            computed_at: self.clock.now(),
        });

        *self.current.write().await = Some(Arc::clone(&snapshot));
        tracing::info!(
            "Client profile snapshot refreshed: {} profile(s)",
            snapshot.profiles.len()
        );

        Ok(snapshot)
    }

    /// Drops the snapshot; the next `get` recomputes.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
        tracing::info!("Client profile snapshot invalidated");
    }

    pub async fn status(&self) -> CacheStatus {
        let current = self.current.read().await.clone();
        let now = self.clock.now();

        CacheStatus {
            cached: current.is_some(),
            expired: current
                .as_ref()
                .map(|s| self.is_expired(s, now))
                .unwrap_or(true),
            profiles: current.as_ref().map(|s| s.profiles.len()).unwrap_or(0),
            computed_at: current.as_ref().map(|s| s.computed_at),
            age_secs: current
                .as_ref()
                .map(|s| now.signed_duration_since(s.computed_at).num_seconds()),
            ttl_secs: self.ttl.as_secs(),
            sheet: self.sheet.clone(),
            stats: current.as_ref().map(|s| s.stats),
        }
    }
}
