//! Channel collaborator contract shared by every outbound transport.
//!
//! A channel creates one notification per session and later replaces its text
//! and attachment through the [`MessageHandle`] returned on creation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::Part;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DETAIL_MAX_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `NotificationTransport` values.
pub enum NotificationTransport {
    Telegram,
    Discord,
}

impl NotificationTransport {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque provider message id addressing a previously created notification.
pub struct MessageHandle(String);

impl MessageHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Destination chat/channel id plus the bot token used to reach it.
pub struct ChannelCredentials {
    pub target: String,
    pub token: String,
}

impl std::fmt::Debug for ChannelCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelCredentials")
            .field("target", &self.target)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
/// Errors returned by channel create/edit calls.
pub enum ChannelDeliveryError {
    #[error("failed to read attachment {}: {source}", .path.display())]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{transport} request failed: {source}")]
    Transport {
        transport: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "{transport} provider rejected request: reason_code={reason_code} retryable={retryable} http_status={http_status} detail={detail}"
    )]
    Provider {
        transport: &'static str,
        reason_code: &'static str,
        retryable: bool,
        http_status: u16,
        detail: String,
    },
    #[error("{transport} response did not include a message id")]
    MissingMessageId { transport: &'static str },
}

#[async_trait]
/// Trait contract for `NotificationChannel` behavior.
pub trait NotificationChannel: Send + Sync {
    fn transport(&self) -> NotificationTransport;

    /// Sends a new notification and returns the handle for later edits.
    async fn create_notification(
        &self,
        credentials: &ChannelCredentials,
        message: &str,
        attachment_path: &Path,
    ) -> Result<MessageHandle, ChannelDeliveryError>;

    /// Replaces the text and attachment of a previously created notification.
    async fn edit_notification(
        &self,
        credentials: &ChannelCredentials,
        handle: &MessageHandle,
        attachment_path: &Path,
        message: &str,
    ) -> Result<(), ChannelDeliveryError>;
}

pub(crate) fn classify_provider_status(status: StatusCode) -> (&'static str, bool) {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ("delivery_rate_limited", true);
    }
    if status.is_server_error() {
        return ("delivery_provider_unavailable", true);
    }
    if status.is_client_error() {
        return ("delivery_request_rejected", false);
    }
    ("delivery_unknown_http_failure", true)
}

pub(crate) fn truncate_detail(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= DETAIL_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut output: String = trimmed.chars().take(DETAIL_MAX_CHARS).collect();
    output.push_str("...");
    output
}

pub(crate) fn clip_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Reads the attachment into a multipart part named after the file on disk.
pub(crate) async fn read_attachment_part(path: &Path) -> Result<Part, ChannelDeliveryError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ChannelDeliveryError::AttachmentRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Part::bytes(bytes).file_name(attachment_file_name(path)))
}

/// File name the attachment is uploaded under.
pub(crate) fn attachment_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tokens.txt")
        .to_string()
}

/// Turns a provider response into the parsed JSON body or a classified error.
pub(crate) async fn read_provider_response(
    transport: NotificationTransport,
    response: reqwest::Response,
) -> Result<serde_json::Value, ChannelDeliveryError> {
    let status = response.status();
    let body_raw = response
        .text()
        .await
        .map_err(|source| ChannelDeliveryError::Transport {
            transport: transport.as_str(),
            source,
        })?;
    if !status.is_success() {
        let (reason_code, retryable) = classify_provider_status(status);
        return Err(ChannelDeliveryError::Provider {
            transport: transport.as_str(),
            reason_code,
            retryable,
            http_status: status.as_u16(),
            detail: truncate_detail(&body_raw),
        });
    }
    Ok(serde_json::from_str(&body_raw).unwrap_or(serde_json::Value::Null))
}
