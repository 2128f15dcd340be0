//! Configuration loading: TOML file plus environment overrides for secrets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidewatchError};

/// Default upstream schedule feed.
pub const DEFAULT_FEED_URL: &str =
    "https://qnaiv.github.io/splatoon3-schedule-notificator/api/schedule.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TidewatchConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Snapshot freshness window in minutes.
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// Bot token; also settable via `TIDEWATCH_DISCORD_TOKEN`.
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Periodic check interval in minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// SQLite file path; defaults to `<home>/subscriptions.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Shared secret for command-request signatures; also settable via
    /// `TIDEWATCH_GATEWAY_SECRET`. Unset disables verification.
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_cache_minutes() -> u64 {
    10
}
fn default_interval_minutes() -> u64 {
    3
}
fn default_store_backend() -> String {
    "sqlite".to_string()
}
fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}
fn default_gateway_port() -> u16 {
    8787
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { url: default_feed_url(), cache_minutes: default_cache_minutes() }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self { interval_minutes: default_interval_minutes() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: default_store_backend(), path: None }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_gateway_host(), port: default_gateway_port(), secret: None }
    }
}

impl TidewatchConfig {
    /// `~/.tidewatch` (created on demand by callers that need it).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".tidewatch")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from `path` (or the default location), then apply environment
    /// overrides. A missing default file yields the defaults; a missing
    /// explicit file or a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|e| TidewatchError::Config(format!("{}: {e}", path.display())))?
        } else if explicit {
            return Err(TidewatchError::ConfigNotFound(path.display().to_string()));
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("TIDEWATCH_DISCORD_TOKEN") {
            if !token.is_empty() {
                self.discord.bot_token = token;
            }
        }
        if let Ok(secret) = std::env::var("TIDEWATCH_GATEWAY_SECRET") {
            if !secret.is_empty() {
                self.gateway.secret = Some(secret);
            }
        }
    }

    /// Fatal at startup: delivery cannot work without credentials.
    pub fn require_bot_token(&self) -> Result<&str> {
        if self.discord.bot_token.is_empty() {
            return Err(TidewatchError::Config(
                "discord.bot_token is not set (config file or TIDEWATCH_DISCORD_TOKEN)".into(),
            ));
        }
        Ok(&self.discord.bot_token)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::home_dir().join("subscriptions.db"))
    }

    /// Copy safe to print: secrets masked.
    pub fn sanitized(&self) -> Self {
        let mut copy = self.clone();
        if !copy.discord.bot_token.is_empty() {
            copy.discord.bot_token = "****".into();
        }
        if copy.gateway.secret.is_some() {
            copy.gateway.secret = Some("****".into());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TidewatchConfig::default();
        assert_eq!(config.feed.cache_minutes, 10);
        assert_eq!(config.checker.interval_minutes, 3);
        assert_eq!(config.store.backend, "sqlite");
        assert!(config.gateway.secret.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TidewatchConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TidewatchError::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[checker]\ninterval_minutes = 1\n").unwrap();
        let config = TidewatchConfig::load(Some(&path)).unwrap();
        assert_eq!(config.checker.interval_minutes, 1);
        assert_eq!(config.feed.cache_minutes, 10);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not toml [").unwrap();
        let err = TidewatchConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, TidewatchError::Config(_)));
    }

    #[test]
    fn test_require_bot_token() {
        let mut config = TidewatchConfig::default();
        assert!(config.require_bot_token().is_err());
        config.discord.bot_token = "token".into();
        assert_eq!(config.require_bot_token().unwrap(), "token");
    }

    #[test]
    fn test_sanitized_masks_secrets() {
        let mut config = TidewatchConfig::default();
        config.discord.bot_token = "secret-token".into();
        config.gateway.secret = Some("hush".into());
        let safe = config.sanitized();
        assert_eq!(safe.discord.bot_token, "****");
        assert_eq!(safe.gateway.secret.as_deref(), Some("****"));
    }
}
