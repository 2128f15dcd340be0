//! In-memory subscription store for tests and ephemeral runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tidewatch_core::error::{Result, TidewatchError};
use tidewatch_core::traits::SubscriptionStore;
use tidewatch_core::types::Subscriber;

/// BTreeMap keeps `load_all` order stable across runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, Subscriber>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Subscriber>>> {
        self.records
            .lock()
            .map_err(|e| TidewatchError::Store(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, subscriber_id: &str) -> Result<Option<Subscriber>> {
        Ok(self.lock()?.get(subscriber_id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<Subscriber>> {
        Ok(self.lock()?.values().filter(|s| s.is_active()).cloned().collect())
    }

    async fn save(&self, subscriber: &Subscriber) -> Result<()> {
        self.lock()?
            .insert(subscriber.subscriber_id.clone(), subscriber.clone());
        Ok(())
    }

    async fn record_notified(
        &self,
        subscriber_id: &str,
        condition_id: &str,
        when: DateTime<Utc>,
    ) -> Result<bool> {
        let mut records = self.lock()?;
        let Some(subscriber) = records.get_mut(subscriber_id) else {
            return Ok(false);
        };
        let Some(condition) = subscriber.conditions.iter_mut().find(|c| c.id == condition_id)
        else {
            return Ok(false);
        };
        if condition.last_notified.is_some_and(|prev| prev > when) {
            return Ok(true);
        }
        condition.last_notified = Some(when);
        subscriber.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, subscriber_id: &str) -> Result<bool> {
        Ok(self.lock()?.remove(subscriber_id).is_some())
    }
}
