//! Telegram Bot API adapter: `sendDocument` to create, `editMessageMedia` to edit.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::Form;
use serde_json::{json, Value};

use crate::notify_channel::{
    clip_chars, read_attachment_part, read_provider_response, ChannelCredentials,
    ChannelDeliveryError, MessageHandle, NotificationChannel, NotificationTransport,
};

const TELEGRAM_CAPTION_MAX_CHARS: usize = 1024;

#[derive(Debug, Clone)]
/// Public struct `TelegramNotificationChannel` used across Herald components.
pub struct TelegramNotificationChannel {
    api_base: String,
    client: reqwest::Client,
}

impl TelegramNotificationChannel {
    pub fn new(api_base: &str, http_timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(http_timeout_ms))
            .build()
            .context("failed to build telegram http client")?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token.trim(), method)
    }

    async fn post_form(
        &self,
        credentials: &ChannelCredentials,
        method: &str,
        form: Form,
    ) -> Result<Value, ChannelDeliveryError> {
        let response = self
            .client
            .post(self.endpoint(&credentials.token, method))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ChannelDeliveryError::Transport {
                transport: NotificationTransport::Telegram.as_str(),
                source,
            })?;
        read_provider_response(NotificationTransport::Telegram, response).await
    }
}

#[async_trait]
impl NotificationChannel for TelegramNotificationChannel {
    fn transport(&self) -> NotificationTransport {
        NotificationTransport::Telegram
    }

    async fn create_notification(
        &self,
        credentials: &ChannelCredentials,
        message: &str,
        attachment_path: &Path,
    ) -> Result<MessageHandle, ChannelDeliveryError> {
        let document = read_attachment_part(attachment_path).await?;
        let form = Form::new()
            .text("chat_id", credentials.target.clone())
            .text("caption", clip_chars(message, TELEGRAM_CAPTION_MAX_CHARS))
            .part("document", document);
        let payload = self.post_form(credentials, "sendDocument", form).await?;
        payload
            .get("result")
            .and_then(|result| result.get("message_id"))
            .and_then(Value::as_i64)
            .map(|message_id| MessageHandle::new(message_id.to_string()))
            .ok_or(ChannelDeliveryError::MissingMessageId {
                transport: NotificationTransport::Telegram.as_str(),
            })
    }

    async fn edit_notification(
        &self,
        credentials: &ChannelCredentials,
        handle: &MessageHandle,
        attachment_path: &Path,
        message: &str,
    ) -> Result<(), ChannelDeliveryError> {
        let document = read_attachment_part(attachment_path).await?;
        let media = json!({
            "type": "document",
            "media": "attach://document",
            "caption": clip_chars(message, TELEGRAM_CAPTION_MAX_CHARS),
        });
        let form = Form::new()
            .text("chat_id", credentials.target.clone())
            .text("message_id", handle.as_str().to_string())
            .text("media", media.to_string())
            .part("document", document);
        self.post_form(credentials, "editMessageMedia", form).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use super::TelegramNotificationChannel;
    use crate::notify_channel::{
        ChannelCredentials, ChannelDeliveryError, MessageHandle, NotificationChannel,
    };

    fn credentials() -> ChannelCredentials {
        ChannelCredentials {
            target: "chat-1".to_string(),
            token: "test-token".to_string(),
        }
    }

    fn attachment(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("Ab3dE6gH9j.txt");
        std::fs::write(&path, "[\n  {\n    \"name\": \"sid\"\n  }\n]").expect("write attachment");
        path
    }

    #[tokio::test]
    async fn integration_create_posts_send_document_and_returns_message_id() {
        let server = MockServer::start();
        let sent = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendDocument")
                .body_includes("chat-1")
                .body_includes("Ab3dE6gH9j.txt")
                .body_includes("session summary");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 555}}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let channel = TelegramNotificationChannel::new(&server.base_url(), 5_000).expect("channel");

        let handle = channel
            .create_notification(&credentials(), "session summary", &attachment(&dir))
            .await
            .expect("create should succeed");

        sent.assert_calls(1);
        assert_eq!(handle, MessageHandle::new("555"));
    }

    #[tokio::test]
    async fn integration_edit_posts_edit_message_media_for_handle() {
        let server = MockServer::start();
        let edited = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/editMessageMedia")
                .body_includes("attach://document")
                .body_includes("555")
                .body_includes("updated summary");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 555}}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let channel = TelegramNotificationChannel::new(&server.base_url(), 5_000).expect("channel");

        channel
            .edit_notification(
                &credentials(),
                &MessageHandle::new("555"),
                &attachment(&dir),
                "updated summary",
            )
            .await
            .expect("edit should succeed");

        edited.assert_calls(1);
    }

    #[tokio::test]
    async fn regression_create_classifies_rejected_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bottest-token/sendDocument");
            then.status(400)
                .json_body(json!({"ok": false, "description": "Bad Request: chat not found"}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let channel = TelegramNotificationChannel::new(&server.base_url(), 5_000).expect("channel");

        let error = channel
            .create_notification(&credentials(), "summary", &attachment(&dir))
            .await
            .expect_err("create should fail");

        match error {
            ChannelDeliveryError::Provider {
                reason_code,
                retryable,
                http_status,
                detail,
                ..
            } => {
                assert_eq!(reason_code, "delivery_request_rejected");
                assert!(!retryable);
                assert_eq!(http_status, 400);
                assert!(detail.contains("chat not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn regression_create_requires_message_id_in_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bottest-token/sendDocument");
            then.status(200).json_body(json!({"ok": true, "result": {}}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let channel = TelegramNotificationChannel::new(&server.base_url(), 5_000).expect("channel");

        let error = channel
            .create_notification(&credentials(), "summary", &attachment(&dir))
            .await
            .expect_err("missing message id");
        assert!(matches!(
            error,
            ChannelDeliveryError::MissingMessageId { .. }
        ));
    }

    #[tokio::test]
    async fn regression_missing_attachment_fails_before_any_request() {
        let server = MockServer::start();
        let sent = server.mock(|when, then| {
            when.method(POST).path("/bottest-token/sendDocument");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 1}}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let channel = TelegramNotificationChannel::new(&server.base_url(), 5_000).expect("channel");

        let error = channel
            .create_notification(&credentials(), "summary", &dir.path().join("absent.txt"))
            .await
            .expect_err("attachment read should fail");

        assert!(matches!(error, ChannelDeliveryError::AttachmentRead { .. }));
        sent.assert_calls(0);
    }
}
