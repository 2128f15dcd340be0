//! SQLite subscription store.
//!
//! One row per subscriber with the whole record as a JSON blob. `INSERT OR
//! REPLACE` under the connection mutex makes every save all-or-nothing: a
//! reader sees the old record or the new one, never a hybrid. The conditions
//! list and its `last_notified` values therefore can never disagree.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use tidewatch_core::error::{Result, TidewatchError};
use tidewatch_core::traits::SubscriptionStore;
use tidewatch_core::types::Subscriber;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| TidewatchError::Store(e.to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS subscribers (
                subscriber_id TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|e| TidewatchError::Store(e.to_string()))?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TidewatchError::Store(format!("connection poisoned: {e}")))
    }

    fn write_record(conn: &Connection, subscriber: &Subscriber) -> Result<()> {
        let record = serde_json::to_string(subscriber)?;
        conn.execute(
            "INSERT OR REPLACE INTO subscribers (subscriber_id, record, updated_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![
                subscriber.subscriber_id,
                record,
                subscriber.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| TidewatchError::Store(e.to_string()))?;
        Ok(())
    }

    fn read_record(conn: &Connection, subscriber_id: &str) -> Result<Option<Subscriber>> {
        let mut stmt = conn
            .prepare("SELECT record FROM subscribers WHERE subscriber_id = ?1")
            .map_err(|e| TidewatchError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(rusqlite::params![subscriber_id])
            .map_err(|e| TidewatchError::Store(e.to_string()))?;

        match rows.next().map_err(|e| TidewatchError::Store(e.to_string()))? {
            Some(row) => {
                let record: String = row.get(0).map_err(|e| TidewatchError::Store(e.to_string()))?;
                Ok(Some(serde_json::from_str(&record)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SubscriptionStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, subscriber_id: &str) -> Result<Option<Subscriber>> {
        let conn = self.lock()?;
        Self::read_record(&conn, subscriber_id)
    }

    async fn load_all(&self) -> Result<Vec<Subscriber>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT record FROM subscribers ORDER BY subscriber_id")
            .map_err(|e| TidewatchError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| TidewatchError::Store(e.to_string()))?;

        let mut subscribers = Vec::new();
        for record in rows {
            let record = record.map_err(|e| TidewatchError::Store(e.to_string()))?;
            match serde_json::from_str::<Subscriber>(&record) {
                Ok(sub) if sub.is_active() => subscribers.push(sub),
                Ok(_) => {}
                // A malformed record must not take the whole batch down.
                Err(e) => tracing::error!(error = %e, "skipping malformed subscriber record"),
            }
        }
        Ok(subscribers)
    }

    async fn save(&self, subscriber: &Subscriber) -> Result<()> {
        let conn = self.lock()?;
        Self::write_record(&conn, subscriber)?;
        tracing::debug!(
            subscriber = %subscriber.subscriber_id,
            conditions = subscriber.conditions.len(),
            "subscriber record saved"
        );
        Ok(())
    }

    async fn record_notified(
        &self,
        subscriber_id: &str,
        condition_id: &str,
        when: DateTime<Utc>,
    ) -> Result<bool> {
        // Read-modify-write under one lock so nothing interleaves.
        let conn = self.lock()?;
        let Some(mut subscriber) = Self::read_record(&conn, subscriber_id)? else {
            return Ok(false);
        };

        let Some(condition) = subscriber.conditions.iter_mut().find(|c| c.id == condition_id)
        else {
            return Ok(false);
        };

        // last_notified is monotonically non-decreasing once set.
        if condition.last_notified.is_some_and(|prev| prev > when) {
            return Ok(true);
        }
        condition.last_notified = Some(when);
        subscriber.updated_at = Utc::now();

        Self::write_record(&conn, &subscriber)?;
        Ok(true)
    }

    async fn delete(&self, subscriber_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "DELETE FROM subscribers WHERE subscriber_id = ?1",
                rusqlite::params![subscriber_id],
            )
            .map_err(|e| TidewatchError::Store(e.to_string()))?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::types::NotificationCondition;

    fn open_scratch() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let (_dir, store) = open_scratch();
        let sub = Subscriber::new("u1", "chan1", vec![NotificationCondition::new("c1", 10)]);

        store.save(&sub).await.unwrap();
        let loaded = store.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded, sub);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let (_dir, store) = open_scratch();
        assert!(store.load("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_all_skips_inert_subscribers() {
        let (_dir, store) = open_scratch();
        store.save(&Subscriber::new("empty", "c0", vec![])).await.unwrap();
        store
            .save(&Subscriber::new("u1", "c1", vec![NotificationCondition::new("c", 5)]))
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].subscriber_id, "u1");
    }

    #[tokio::test]
    async fn test_save_is_full_replace() {
        let (_dir, store) = open_scratch();
        let mut sub = Subscriber::new("u1", "chan1", vec![NotificationCondition::new("a", 10)]);
        store.save(&sub).await.unwrap();

        sub.conditions = vec![NotificationCondition::new("b", 20)];
        store.save(&sub).await.unwrap();

        let loaded = store.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.conditions.len(), 1);
        assert_eq!(loaded.conditions[0].name, "b");
    }

    #[tokio::test]
    async fn test_record_notified_updates_one_condition() {
        let (_dir, store) = open_scratch();
        let c1 = NotificationCondition::new("a", 10);
        let c2 = NotificationCondition::new("b", 20);
        let target = c2.id.clone();
        store.save(&Subscriber::new("u1", "chan1", vec![c1, c2])).await.unwrap();

        let when = Utc::now();
        assert!(store.record_notified("u1", &target, when).await.unwrap());

        let loaded = store.load("u1").await.unwrap().unwrap();
        assert!(loaded.conditions[0].last_notified.is_none());
        assert_eq!(loaded.conditions[1].last_notified, Some(when));
    }

    #[tokio::test]
    async fn test_record_notified_missing_is_benign() {
        let (_dir, store) = open_scratch();
        assert!(!store.record_notified("ghost", "c", Utc::now()).await.unwrap());

        store
            .save(&Subscriber::new("u1", "chan1", vec![NotificationCondition::new("a", 10)]))
            .await
            .unwrap();
        assert!(!store.record_notified("u1", "no-such-condition", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let (_dir, store) = open_scratch();
        store
            .save(&Subscriber::new("u1", "chan1", vec![NotificationCondition::new("a", 10)]))
            .await
            .unwrap();

        assert!(store.delete("u1").await.unwrap());
        assert!(!store.delete("u1").await.unwrap());
        assert!(store.load("u1").await.unwrap().is_none());
    }
}
