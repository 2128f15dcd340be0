//! Discord delivery channel (REST API only).
//!
//! One notification becomes one embed posted to the subscriber's channel.
//! Delivery failure of any kind is reported as `Ok(false)`: the engine keeps
//! the entry un-recorded and retries it next cycle, so nothing is lost to a
//! transient Discord outage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tidewatch_core::error::Result;
use tidewatch_core::traits::DeliveryChannel;
use tidewatch_core::types::{EntryKind, NotificationMessage};

const EMBED_COLOR_REGULAR: u32 = 0x00ff88;
const EMBED_COLOR_EVENT: u32 = 0xff6600;

/// Discord channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordChannelConfig {
    pub bot_token: String,
}

/// Discord REST channel.
pub struct DiscordChannel {
    client: reqwest::Client,
    api_base: String,
}

impl DiscordChannel {
    pub fn new(config: DiscordChannelConfig) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(auth) = format!("Bot {}", config.bot_token).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, auth);
        }
        if let Ok(agent) = concat!("tidewatch/", env!("CARGO_PKG_VERSION")).parse() {
            headers.insert(reqwest::header::USER_AGENT, agent);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, api_base: "https://discord.com/api/v10".into() }
    }

    #[cfg(test)]
    fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[async_trait]
impl DeliveryChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send_notification(
        &self,
        destination_id: &str,
        message: &NotificationMessage,
    ) -> Result<bool> {
        let url = format!("{}/channels/{destination_id}/messages", self.api_base);
        let body = serde_json::json!({ "embeds": [render_embed(message)] });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(destination = destination_id, error = %e, "discord send failed");
                return Ok(false);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(
                destination = destination_id,
                %status,
                body = %text,
                "discord rejected notification"
            );
            return Ok(false);
        }
        Ok(true)
    }
}

/// Build the embed payload for one notification.
fn render_embed(message: &NotificationMessage) -> serde_json::Value {
    let entry = &message.entry;
    let start = format!("<t:{}:f>", entry.start_time.timestamp());
    let description = format!(
        "**{}** matched, {} minutes ahead!",
        message.condition_name, message.notify_minutes_before
    );

    let mut fields = Vec::new();
    if let Some(event) = &entry.event {
        fields.push(serde_json::json!({ "name": "Event", "value": event.name, "inline": true }));
    }
    fields.push(serde_json::json!({ "name": "Rule", "value": entry.rule.name, "inline": true }));
    fields.push(serde_json::json!({
        "name": "Match type",
        "value": entry.kind.display_name(),
        "inline": true
    }));
    fields.push(serde_json::json!({
        "name": "Stages",
        "value": entry.stage_names(),
        "inline": false
    }));
    fields.push(serde_json::json!({ "name": "Starts", "value": start, "inline": false }));
    if let Some(event) = &entry.event {
        if !event.desc.is_empty() {
            fields.push(serde_json::json!({
                "name": "Details",
                "value": event.desc,
                "inline": false
            }));
        }
    }

    let (title, color) = if entry.kind == EntryKind::Event {
        ("🎪 Event rotation alert", EMBED_COLOR_EVENT)
    } else {
        ("🦑 Schedule rotation alert", EMBED_COLOR_REGULAR)
    };

    serde_json::json!({
        "title": title,
        "description": description,
        "fields": fields,
        "color": color,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "footer": { "text": "Tidewatch schedule bot" }
    })
}
