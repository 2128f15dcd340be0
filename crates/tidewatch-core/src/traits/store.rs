//! Durable per-subscriber state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Subscriber;

/// Subscription storage backend.
///
/// `save` is a full atomic replace of one subscriber record; a concurrent
/// reader observes either the old or the new record, never a half-written
/// one. Atomicity is per record; no serializability guarantee is made
/// across different subscribers.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` for a missing key; never an error.
    async fn load(&self, subscriber_id: &str) -> Result<Option<Subscriber>>;

    /// Every subscriber with at least one condition.
    async fn load_all(&self) -> Result<Vec<Subscriber>>;

    async fn save(&self, subscriber: &Subscriber) -> Result<()>;

    /// Update exactly one condition's `last_notified`, read-modify-write.
    /// Returns false when the subscriber or condition no longer exists
    /// (benign miss, not an error).
    async fn record_notified(
        &self,
        subscriber_id: &str,
        condition_id: &str,
        when: DateTime<Utc>,
    ) -> Result<bool>;

    /// Returns whether a record existed.
    async fn delete(&self, subscriber_id: &str) -> Result<bool>;
}
