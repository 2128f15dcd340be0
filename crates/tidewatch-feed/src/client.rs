//! HTTP client for the schedule feed.

use serde::Deserialize;
use tidewatch_core::error::{Result, TidewatchError};
use tidewatch_core::types::{EventInfo, RuleRef, StageRef};

/// Raw feed document. Deserializing into this shape is also the structural
/// validation gate: a response without `data.result` never reaches the cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchedule {
    #[serde(default)]
    pub last_updated: Option<String>,
    pub data: RawData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawData {
    pub result: RawResult,
}

/// Fixed category keys; absent categories are empty, never errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub regular: Vec<RawEntry>,
    #[serde(default)]
    pub bankara_challenge: Vec<RawEntry>,
    #[serde(default)]
    pub bankara_open: Vec<RawEntry>,
    #[serde(default)]
    pub x: Vec<RawEntry>,
    #[serde(default)]
    pub event: Vec<RawEventEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub start_time: String,
    pub end_time: String,
    pub rule: RuleRef,
    #[serde(default)]
    pub stages: Vec<StageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEventEntry {
    #[serde(flatten)]
    pub base: RawEntry,
    pub event: EventInfo,
    #[serde(default)]
    pub is_fest: bool,
}

/// Fetches the feed document from the configured URL.
pub struct ScheduleClient {
    client: reqwest::Client,
    url: String,
}

impl ScheduleClient {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tidewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { client, url: url.into() }
    }

    pub async fn fetch(&self) -> Result<RawSchedule> {
        tracing::debug!(url = %self.url, "fetching schedule feed");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TidewatchError::Feed(format!("fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TidewatchError::Feed(format!(
                "feed returned HTTP {}",
                response.status()
            )));
        }

        let raw: RawSchedule = response
            .json()
            .await
            .map_err(|e| TidewatchError::Feed(format!("invalid feed document: {e}")))?;

        tracing::debug!(
            last_updated = raw.last_updated.as_deref().unwrap_or("unknown"),
            regular = raw.data.result.regular.len(),
            bankara_challenge = raw.data.result.bankara_challenge.len(),
            bankara_open = raw.data.result.bankara_open.len(),
            x = raw.data.result.x.len(),
            event = raw.data.result.event.len(),
            "schedule feed fetched"
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_categories_deserialize_empty() {
        let json = r#"{"lastUpdated": "2026-08-01T00:00:00Z", "data": {"result": {"regular": []}}}"#;
        let raw: RawSchedule = serde_json::from_str(json).unwrap();
        assert!(raw.data.result.bankara_open.is_empty());
        assert!(raw.data.result.event.is_empty());
    }

    #[test]
    fn test_missing_result_is_rejected() {
        let json = r#"{"lastUpdated": "2026-08-01T00:00:00Z", "data": {}}"#;
        assert!(serde_json::from_str::<RawSchedule>(json).is_err());
    }

    #[test]
    fn test_event_entry_flattens_base_fields() {
        let json = r#"{
            "start_time": "2026-08-01T10:00:00Z",
            "end_time": "2026-08-01T12:00:00Z",
            "rule": {"id": "area", "name": "Splat Zones"},
            "stages": [{"id": "s1", "name": "Scorch Gorge"}],
            "event": {"id": "e1", "name": "Monthly Challenge", "desc": "tricolor"},
            "is_fest": false
        }"#;
        let raw: RawEventEntry = serde_json::from_str(json).unwrap();
        assert_eq!(raw.base.rule.name, "Splat Zones");
        assert_eq!(raw.event.name, "Monthly Challenge");
    }
}
