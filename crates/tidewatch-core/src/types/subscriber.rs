//! Persisted subscriber records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::NotificationCondition;

/// One addressable recipient and its full condition list.
///
/// The whole record is written atomically, so the conditions and their
/// `last_notified` values can never disagree in storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub subscriber_id: String,
    /// Opaque delivery address (a Discord channel id).
    pub destination_id: String,
    pub conditions: Vec<NotificationCondition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Regenerated on every save; echoed back to the authoring surface.
    pub setting_id: String,
}

impl Subscriber {
    pub fn new(
        subscriber_id: impl Into<String>,
        destination_id: impl Into<String>,
        conditions: Vec<NotificationCondition>,
    ) -> Self {
        let now = Utc::now();
        Self {
            subscriber_id: subscriber_id.into(),
            destination_id: destination_id.into(),
            conditions,
            created_at: now,
            updated_at: now,
            setting_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// A subscriber with zero conditions is inert but not an error.
    pub fn is_active(&self) -> bool {
        !self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_subscriber_is_inert() {
        let sub = Subscriber::new("u1", "chan1", vec![]);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_json_round_trip() {
        let sub = Subscriber::new("u1", "chan1", vec![NotificationCondition::new("c", 10)]);
        let json = serde_json::to_string(&sub).unwrap();
        let back: Subscriber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sub);
    }
}
