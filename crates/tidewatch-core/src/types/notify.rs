//! Outbound notification payload handed to a delivery channel.

use serde::{Deserialize, Serialize};

use super::condition::NotificationCondition;
use super::schedule::ScheduleEntry;

/// Everything a channel needs to render one alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub condition_name: String,
    pub notify_minutes_before: u32,
    pub entry: ScheduleEntry,
}

impl NotificationMessage {
    pub fn new(condition: &NotificationCondition, entry: &ScheduleEntry) -> Self {
        Self {
            condition_name: condition.name.clone(),
            notify_minutes_before: condition.notify_minutes_before,
            entry: entry.clone(),
        }
    }
}
