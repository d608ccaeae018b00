//! Discord REST adapter: create a channel message with the token file, then
//! patch the same message on updates.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::{json, Value};

use crate::notify_channel::{
    attachment_file_name, clip_chars, read_attachment_part, read_provider_response,
    ChannelCredentials, ChannelDeliveryError, MessageHandle, NotificationChannel,
    NotificationTransport,
};

const DISCORD_CONTENT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone)]
/// Public struct `DiscordNotificationChannel` used across Herald components.
pub struct DiscordNotificationChannel {
    api_base: String,
    client: reqwest::Client,
}

impl DiscordNotificationChannel {
    pub fn new(api_base: &str, http_timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(http_timeout_ms))
            .build()
            .context("failed to build discord http client")?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn send_message_form(
        &self,
        method: Method,
        endpoint: String,
        credentials: &ChannelCredentials,
        payload: Value,
        attachment_path: &Path,
    ) -> Result<Value, ChannelDeliveryError> {
        let file = read_attachment_part(attachment_path).await?;
        let form = Form::new()
            .text("payload_json", payload.to_string())
            .part("files[0]", file);
        let response = self
            .client
            .request(method, endpoint)
            .header("Authorization", format!("Bot {}", credentials.token.trim()))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ChannelDeliveryError::Transport {
                transport: NotificationTransport::Discord.as_str(),
                source,
            })?;
        read_provider_response(NotificationTransport::Discord, response).await
    }
}

#[async_trait]
impl NotificationChannel for DiscordNotificationChannel {
    fn transport(&self) -> NotificationTransport {
        NotificationTransport::Discord
    }

    async fn create_notification(
        &self,
        credentials: &ChannelCredentials,
        message: &str,
        attachment_path: &Path,
    ) -> Result<MessageHandle, ChannelDeliveryError> {
        let endpoint = format!(
            "{}/channels/{}/messages",
            self.api_base,
            credentials.target.trim()
        );
        let payload = json!({"content": clip_chars(message, DISCORD_CONTENT_MAX_CHARS)});
        let response = self
            .send_message_form(Method::POST, endpoint, credentials, payload, attachment_path)
            .await?;
        response
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(MessageHandle::new)
            .ok_or(ChannelDeliveryError::MissingMessageId {
                transport: NotificationTransport::Discord.as_str(),
            })
    }

    async fn edit_notification(
        &self,
        credentials: &ChannelCredentials,
        handle: &MessageHandle,
        attachment_path: &Path,
        message: &str,
    ) -> Result<(), ChannelDeliveryError> {
        let endpoint = format!(
            "{}/channels/{}/messages/{}",
            self.api_base,
            credentials.target.trim(),
            handle.as_str()
        );
        // The attachment list is the full post-edit set: only the new `files[0]` upload.
        let payload = json!({
            "content": clip_chars(message, DISCORD_CONTENT_MAX_CHARS),
            "attachments": [{"id": 0, "filename": attachment_file_name(attachment_path)}],
        });
        self.send_message_form(Method::PATCH, endpoint, credentials, payload, attachment_path)
            .await?;
        Ok(())
    }
}
