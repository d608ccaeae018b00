//! Notifier configuration: per-channel credentials, API bases and timeouts.
//!
//! The orchestrator asks its [`NotifierConfigSource`] for a fresh config on
//! every notification so file edits take effect without a restart.

use std::path::PathBuf;

use herald_core::mask_identifier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notify_channel::{ChannelCredentials, NotificationTransport};

pub const TELEGRAM_BOT_TOKEN_ENV: &str = "HERALD_TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID_ENV: &str = "HERALD_TELEGRAM_CHAT_ID";
pub const DISCORD_BOT_TOKEN_ENV: &str = "HERALD_DISCORD_BOT_TOKEN";
pub const DISCORD_CHANNEL_ID_ENV: &str = "HERALD_DISCORD_CHANNEL_ID";

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Error)]
/// Errors raised while loading or resolving notifier configuration.
pub enum ConfigError {
    #[error("failed to read notifier config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse notifier config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{transport} notifications are disabled")]
    ChannelDisabled { transport: &'static str },
    #[error("{transport} notifications require a non-empty {field}")]
    MissingValue {
        transport: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Public struct `ChannelSettings` used across Herald components.
pub struct ChannelSettings {
    pub enabled: bool,
    pub token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Public struct `NotifierConfig` used across Herald components.
pub struct NotifierConfig {
    pub telegram: ChannelSettings,
    pub discord: ChannelSettings,
    pub telegram_api_base: String,
    pub discord_api_base: String,
    pub http_timeout_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            telegram: ChannelSettings::default(),
            discord: ChannelSettings::default(),
            telegram_api_base: default_telegram_api_base(),
            discord_api_base: default_discord_api_base(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Masked per-channel view used by status output.
pub struct ChannelStatus {
    pub transport: String,
    pub enabled: bool,
    pub chat_id: String,
    pub token_configured: bool,
}

fn resolve_non_empty_value(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl NotifierConfig {
    pub fn channel(&self, transport: NotificationTransport) -> &ChannelSettings {
        match transport {
            NotificationTransport::Telegram => &self.telegram,
            NotificationTransport::Discord => &self.discord,
        }
    }

    /// First enabled channel, Telegram before Discord.
    pub fn preferred_transport(&self) -> Option<NotificationTransport> {
        [NotificationTransport::Telegram, NotificationTransport::Discord]
            .into_iter()
            .find(|transport| self.channel(*transport).enabled)
    }

    /// Resolves the destination and token for `transport`.
    pub fn credentials_for(
        &self,
        transport: NotificationTransport,
    ) -> Result<ChannelCredentials, ConfigError> {
        let settings = self.channel(transport);
        if !settings.enabled {
            return Err(ConfigError::ChannelDisabled {
                transport: transport.as_str(),
            });
        }
        let target = resolve_non_empty_value(settings.chat_id.as_deref()).ok_or(
            ConfigError::MissingValue {
                transport: transport.as_str(),
                field: "chat_id",
            },
        )?;
        let token = resolve_non_empty_value(settings.token.as_deref()).ok_or(
            ConfigError::MissingValue {
                transport: transport.as_str(),
                field: "token",
            },
        )?;
        Ok(ChannelCredentials { target, token })
    }

    /// Overlays non-blank values from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (TELEGRAM_BOT_TOKEN_ENV, &mut self.telegram.token),
            (TELEGRAM_CHAT_ID_ENV, &mut self.telegram.chat_id),
            (DISCORD_BOT_TOKEN_ENV, &mut self.discord.token),
            (DISCORD_CHANNEL_ID_ENV, &mut self.discord.chat_id),
        ];
        for (key, slot) in overrides {
            if let Some(value) = resolve_non_empty_value(lookup(key).as_deref()) {
                *slot = Some(value);
            }
        }
    }

    pub fn status_summary(&self) -> Vec<ChannelStatus> {
        [NotificationTransport::Telegram, NotificationTransport::Discord]
            .into_iter()
            .map(|transport| {
                let settings = self.channel(transport);
                ChannelStatus {
                    transport: transport.as_str().to_string(),
                    enabled: settings.enabled,
                    chat_id: mask_identifier(settings.chat_id.as_deref().unwrap_or_default()),
                    token_configured: resolve_non_empty_value(settings.token.as_deref())
                        .is_some(),
                }
            })
            .collect()
    }
}

/// Trait contract for `NotifierConfigSource` behavior.
pub trait NotifierConfigSource: Send + Sync {
    fn load_config(&self) -> Result<NotifierConfig, ConfigError>;
}

#[derive(Debug, Clone)]
/// Reads a JSON config file on every load and applies environment overrides.
pub struct FileNotifierConfigSource {
    path: PathBuf,
}

impl FileNotifierConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NotifierConfigSource for FileNotifierConfigSource {
    fn load_config(&self) -> Result<NotifierConfig, ConfigError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut config: NotifierConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

#[derive(Debug, Clone)]
/// Serves a fixed config; used by embedding callers and tests.
pub struct StaticNotifierConfigSource {
    config: NotifierConfig,
}

impl StaticNotifierConfigSource {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }
}

impl NotifierConfigSource for StaticNotifierConfigSource {
    fn load_config(&self) -> Result<NotifierConfig, ConfigError> {
        Ok(self.config.clone())
    }
}
