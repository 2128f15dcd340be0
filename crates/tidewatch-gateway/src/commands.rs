//! Authoring commands: watch, status, stop, check.
//!
//! The wire format is a small JSON body; the `watch` settings payload is the
//! base64-encoded JSON the condition-authoring UI produces.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use tidewatch_core::types::{NotificationCondition, Subscriber};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    pub subscriber_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub settings: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CommandResponse {
    pub ok: bool,
    pub message: String,
}

impl CommandResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    fn err(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }
}

/// The payload encoded into the `watch` settings string.
#[derive(Debug, Deserialize)]
struct WatchPayload {
    conditions: Vec<NotificationCondition>,
}

pub async fn dispatch(state: &AppState, request: CommandRequest) -> CommandResponse {
    match request.command.as_str() {
        "watch" => watch(state, &request).await,
        "status" => status(state, &request).await,
        "stop" => stop(state, &request).await,
        "check" => check(state).await,
        other => CommandResponse::err(format!("unknown command: {other}")),
    }
}

async fn watch(state: &AppState, request: &CommandRequest) -> CommandResponse {
    let Some(settings) = request.settings.as_deref() else {
        return CommandResponse::err("watch requires a settings payload");
    };

    let mut conditions = match decode_settings(settings) {
        Ok(conditions) => conditions,
        Err(message) => {
            tracing::warn!(subscriber = %request.subscriber_id, %message, "watch payload rejected");
            return CommandResponse::err(message);
        }
    };
    conditions.retain(|c| c.enabled);
    for condition in &mut conditions {
        condition.ensure_id();
    }

    let mut subscriber = Subscriber::new(
        request.subscriber_id.clone(),
        request.destination_id.clone(),
        conditions,
    );
    // Keep the original creation time across re-saves.
    if let Ok(Some(existing)) = state.store.load(&request.subscriber_id).await {
        subscriber.created_at = existing.created_at;
    }

    match state.store.save(&subscriber).await {
        Ok(()) => {
            tracing::info!(
                subscriber = %subscriber.subscriber_id,
                conditions = subscriber.conditions.len(),
                "subscription saved"
            );
            CommandResponse::ok(format!(
                "watching with {} condition(s), setting id {}",
                subscriber.conditions.len(),
                subscriber.setting_id
            ))
        }
        Err(e) => {
            tracing::error!(subscriber = %subscriber.subscriber_id, error = %e, "save failed");
            CommandResponse::err("failed to save subscription, try again later")
        }
    }
}

fn decode_settings(settings: &str) -> Result<Vec<NotificationCondition>, String> {
    let bytes = BASE64
        .decode(settings)
        .map_err(|_| "settings payload is not valid base64".to_string())?;
    let json =
        String::from_utf8(bytes).map_err(|_| "settings payload is not UTF-8".to_string())?;
    let payload: WatchPayload = serde_json::from_str(&json)
        .map_err(|e| format!("settings payload is not a valid condition list: {e}"))?;
    Ok(payload.conditions)
}

async fn status(state: &AppState, request: &CommandRequest) -> CommandResponse {
    match state.store.load(&request.subscriber_id).await {
        Ok(Some(subscriber)) if subscriber.is_active() => {
            let lines: Vec<String> = subscriber
                .conditions
                .iter()
                .map(|c| {
                    format!(
                        "- {} ({} min lead{})",
                        c.name,
                        c.notify_minutes_before,
                        if c.enabled { "" } else { ", disabled" }
                    )
                })
                .collect();
            CommandResponse::ok(format!(
                "{} condition(s), setting id {}:\n{}",
                subscriber.conditions.len(),
                subscriber.setting_id,
                lines.join("\n")
            ))
        }
        Ok(_) => CommandResponse::err("no subscription found; use watch first"),
        Err(e) => {
            tracing::error!(subscriber = %request.subscriber_id, error = %e, "status load failed");
            CommandResponse::err("failed to load subscription, try again later")
        }
    }
}

async fn stop(state: &AppState, request: &CommandRequest) -> CommandResponse {
    match state.store.delete(&request.subscriber_id).await {
        Ok(true) => CommandResponse::ok("subscription deleted"),
        Ok(false) => CommandResponse::err("no subscription found"),
        Err(e) => {
            tracing::error!(subscriber = %request.subscriber_id, error = %e, "delete failed");
            CommandResponse::err("failed to delete subscription, try again later")
        }
    }
}

/// Ack immediately; the cycle itself runs asynchronously since delivery can
/// take longer than a command-response budget. The runner's re-entrancy
/// guard drops the trigger if a cycle is already underway.
async fn check(state: &AppState) -> CommandResponse {
    let runner = state.runner.clone();
    tokio::spawn(async move {
        let report = runner.run_cycle().await;
        tracing::info!(
            sent = report.sent,
            errors = report.errors,
            dropped = report.dropped,
            "manual check finished"
        );
    });
    CommandResponse::ok("check started")
}
