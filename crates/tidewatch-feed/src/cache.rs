//! Bounded-freshness snapshot cache over the schedule feed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use tidewatch_core::error::Result;
use tidewatch_core::traits::ScheduleSource;
use tidewatch_core::types::ScheduleEntry;

use crate::client::{RawSchedule, ScheduleClient};
use crate::normalize::normalize;

/// Something that can produce a raw feed document. Seam for tests.
#[async_trait]
pub trait FetchSchedule: Send + Sync {
    async fn fetch(&self) -> Result<RawSchedule>;
}

#[async_trait]
impl FetchSchedule for ScheduleClient {
    async fn fetch(&self) -> Result<RawSchedule> {
        ScheduleClient::fetch(self).await
    }
}

struct Snapshot {
    entries: Vec<ScheduleEntry>,
    fetched_at: DateTime<Utc>,
}

/// Memoizes the normalized schedule for a fixed freshness window.
///
/// A fetch failure is never papered over with a stale snapshot: once the
/// window has expired the error propagates and the caller skips the cycle.
/// Only a fully validated document updates the cache.
pub struct SnapshotCache<F: FetchSchedule = ScheduleClient> {
    fetcher: F,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<F: FetchSchedule> SnapshotCache<F> {
    pub fn new(fetcher: F, ttl_minutes: u64) -> Self {
        Self {
            fetcher,
            ttl: Duration::minutes(ttl_minutes as i64),
            snapshot: Mutex::new(None),
        }
    }

    pub async fn entries_at(&self, now: DateTime<Utc>) -> Result<Vec<ScheduleEntry>> {
        let mut guard = self.snapshot.lock().await;

        if let Some(snapshot) = guard.as_ref() {
            if now - snapshot.fetched_at < self.ttl {
                return Ok(snapshot.entries.clone());
            }
        }

        let raw = self.fetcher.fetch().await?;
        let entries = normalize(&raw);
        tracing::info!(entries = entries.len(), "schedule snapshot refreshed");
        *guard = Some(Snapshot { entries: entries.clone(), fetched_at: now });
        Ok(entries)
    }
}

#[async_trait]
impl<F: FetchSchedule> ScheduleSource for SnapshotCache<F> {
    async fn entries(&self, now: DateTime<Utc>) -> Result<Vec<ScheduleEntry>> {
        self.entries_at(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tidewatch_core::error::TidewatchError;

    struct CountingFetcher {
        calls: AtomicUsize,
        /// Calls after this many succeed fail instead.
        fail_after: usize,
    }

    impl CountingFetcher {
        fn new(fail_after: usize) -> Self {
            Self { calls: AtomicUsize::new(0), fail_after }
        }
    }

    #[async_trait]
    impl FetchSchedule for CountingFetcher {
        async fn fetch(&self) -> Result<RawSchedule> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.fail_after {
                return Err(TidewatchError::Feed("boom".into()));
            }
            Ok(serde_json::from_str(
                r#"{"data": {"result": {"regular": [{
                    "start_time": "2026-08-01T10:00:00Z",
                    "end_time": "2026-08-01T12:00:00Z",
                    "rule": {"id": "turf", "name": "Turf War"},
                    "stages": []
                }]}}}"#,
            )
            .unwrap())
        }
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_reused() {
        let cache = SnapshotCache::new(CountingFetcher::new(usize::MAX), 10);
        let now = Utc::now();

        let first = cache.entries_at(now).await.unwrap();
        let second = cache.entries_at(now + Duration::minutes(9)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_snapshot_refetches() {
        let cache = SnapshotCache::new(CountingFetcher::new(usize::MAX), 10);
        let now = Utc::now();

        cache.entries_at(now).await.unwrap();
        cache.entries_at(now + Duration::minutes(11)).await.unwrap();
        assert_eq!(cache.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_snapshot_never_masks_failure() {
        let cache = SnapshotCache::new(CountingFetcher::new(1), 10);
        let now = Utc::now();
        cache.entries_at(now).await.unwrap();

        // Within the window the snapshot still serves...
        assert!(cache.entries_at(now + Duration::minutes(5)).await.is_ok());

        // ...but past it the fetch failure propagates instead of the stale copy.
        let err = cache.entries_at(now + Duration::minutes(11)).await.unwrap_err();
        assert!(matches!(err, TidewatchError::Feed(_)));
    }
}
