//! Schedule entry source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::ScheduleEntry;

/// Provides the current normalized schedule for a check cycle.
///
/// An error means the feed is unavailable this cycle; the orchestrator skips
/// the whole cycle rather than evaluate subscribers against a missing feed.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn entries(&self, now: DateTime<Utc>) -> Result<Vec<ScheduleEntry>>;
}
