//! Outbound delivery boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::NotificationMessage;

/// A transport that can deliver one rendered notification.
///
/// `Ok(false)` and `Err` are both non-fatal per-item failures: the engine
/// leaves the entry un-recorded so it is retried next cycle while still
/// in-window. The engine makes at most one send attempt per entry per cycle.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send_notification(
        &self,
        destination_id: &str,
        message: &NotificationMessage,
    ) -> Result<bool>;
}
