//! Bounded retry wrapper around any subscription store.
//!
//! Absorbs transient storage contention: a fixed number of attempts with
//! linear backoff, then the original error propagates. Callers treat that as
//! a failure for the one subscriber involved, never for the whole batch.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tidewatch_core::error::Result;
use tidewatch_core::traits::SubscriptionStore;
use tidewatch_core::types::Subscriber;

pub struct RetryStore<S> {
    inner: S,
    max_attempts: u32,
    base_delay: Duration,
}

impl<S: SubscriptionStore> RetryStore<S> {
    pub fn new(inner: S, max_attempts: u32, base_delay: Duration) -> Self {
        Self { inner, max_attempts: max_attempts.max(1), base_delay }
    }

    /// 3 attempts, backoff of attempt × 1s.
    pub fn with_defaults(inner: S) -> Self {
        Self::new(inner, 3, Duration::from_secs(1))
    }
}

macro_rules! retried {
    ($self:ident, $op:literal, $call:expr) => {{
        let mut attempt: u32 = 1;
        loop {
            match $call.await {
                Ok(value) => break Ok(value),
                Err(e) if attempt < $self.max_attempts => {
                    tracing::warn!(
                        op = $op,
                        attempt,
                        max_attempts = $self.max_attempts,
                        error = %e,
                        "store operation failed, retrying"
                    );
                    tokio::time::sleep($self.base_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => break Err(e),
            }
        }
    }};
}

#[async_trait]
impl<S: SubscriptionStore> SubscriptionStore for RetryStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn load(&self, subscriber_id: &str) -> Result<Option<Subscriber>> {
        retried!(self, "load", self.inner.load(subscriber_id))
    }

    async fn load_all(&self) -> Result<Vec<Subscriber>> {
        retried!(self, "load_all", self.inner.load_all())
    }

    async fn save(&self, subscriber: &Subscriber) -> Result<()> {
        retried!(self, "save", self.inner.save(subscriber))
    }

    async fn record_notified(
        &self,
        subscriber_id: &str,
        condition_id: &str,
        when: DateTime<Utc>,
    ) -> Result<bool> {
        retried!(
            self,
            "record_notified",
            self.inner.record_notified(subscriber_id, condition_id, when)
        )
    }

    async fn delete(&self, subscriber_id: &str) -> Result<bool> {
        retried!(self, "delete", self.inner.delete(subscriber_id))
    }
}
