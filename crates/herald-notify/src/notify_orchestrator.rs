//! Per-session notification state machine (`NEW -> NOTIFIED`).
//!
//! The first observation of a session creates a notification and records its
//! handle; later observations edit that notification in place. Two racing
//! first observations of one session produce a single create: the loser takes
//! the update branch, finds no handle yet and drops its observation. Every
//! outcome is logged and none is surfaced as an error to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::notify_attachment::{write_token_attachment, TokenAttachment};
use crate::notify_channel::{ChannelDeliveryError, MessageHandle, NotificationChannel};
use crate::notify_config::{ConfigError, NotifierConfigSource};
use crate::notify_message::format_session_message;
use crate::session_observation::SessionObservation;
use crate::session_state::SessionStateStore;

#[derive(Debug, Error)]
/// Failures contained to a single `notify` call.
pub enum NotifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write token attachment: {0}")]
    Attachment(#[source] std::io::Error),
    #[error("failed to encode token attachment: {0}")]
    AttachmentEncode(#[source] serde_json::Error),
    #[error("failed to create notification: {0}")]
    Send(#[source] ChannelDeliveryError),
    #[error("failed to edit notification {handle}: {source}")]
    Edit {
        handle: MessageHandle,
        #[source]
        source: ChannelDeliveryError,
    },
}

#[derive(Debug)]
/// What a single `notify` call did. Returned for observability only.
pub enum NotifyOutcome {
    Created(MessageHandle),
    Edited(MessageHandle),
    DroppedMissingHandle,
    Failed(NotifyError),
}

/// Public struct `NotificationOrchestrator` used across Herald components.
pub struct NotificationOrchestrator {
    channel: Arc<dyn NotificationChannel>,
    state: Arc<dyn SessionStateStore>,
    config_source: Arc<dyn NotifierConfigSource>,
    attachment_dir: Option<PathBuf>,
}

impl NotificationOrchestrator {
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        state: Arc<dyn SessionStateStore>,
        config_source: Arc<dyn NotifierConfigSource>,
    ) -> Self {
        Self {
            channel,
            state,
            config_source,
            attachment_dir: None,
        }
    }

    /// Writes attachments under `dir` instead of the system temp directory.
    pub fn with_attachment_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachment_dir = Some(dir.into());
        self
    }

    pub fn state(&self) -> &Arc<dyn SessionStateStore> {
        &self.state
    }

    /// Announces or updates the notification for one session observation.
    #[tracing::instrument(
        name = "herald_notify.notify",
        skip(self, observation),
        fields(session_id = observation.id, channel = self.channel.transport().as_str())
    )]
    pub async fn notify(&self, observation: &SessionObservation) -> NotifyOutcome {
        let outcome = self.notify_inner(observation).await;
        match &outcome {
            NotifyOutcome::Created(handle) => {
                tracing::info!(message_id = %handle, "created session notification");
            }
            NotifyOutcome::Edited(handle) => {
                tracing::info!(message_id = %handle, "updated session notification");
            }
            NotifyOutcome::DroppedMissingHandle => {
                tracing::warn!("no message handle stored for session; dropping update");
            }
            NotifyOutcome::Failed(error) => {
                tracing::error!(error = %error, "session notification failed");
            }
        }
        outcome
    }

    async fn notify_inner(&self, observation: &SessionObservation) -> NotifyOutcome {
        let credentials = match self
            .config_source
            .load_config()
            .and_then(|config| config.credentials_for(self.channel.transport()))
        {
            Ok(credentials) => credentials,
            Err(error) => return NotifyOutcome::Failed(error.into()),
        };

        let session_key = observation.session_key();
        if self.state.mark_if_first(&session_key).await {
            tracing::debug!("first observation of session");
            let (attachment, message) = match self.build_payload(observation) {
                Ok(payload) => payload,
                Err(error) => return NotifyOutcome::Failed(error),
            };
            let result = self
                .channel
                .create_notification(&credentials, &message, attachment.path())
                .await;
            discard_attachment(attachment);
            return match result {
                Ok(handle) => {
                    self.state.set_handle(&session_key, handle.clone()).await;
                    NotifyOutcome::Created(handle)
                }
                Err(error) => NotifyOutcome::Failed(NotifyError::Send(error)),
            };
        }

        let Some(handle) = self.state.get_handle(&session_key).await else {
            return NotifyOutcome::DroppedMissingHandle;
        };
        tracing::debug!(message_id = %handle, "session already notified; editing");
        let (attachment, message) = match self.build_payload(observation) {
            Ok(payload) => payload,
            Err(error) => return NotifyOutcome::Failed(error),
        };
        let result = self
            .channel
            .edit_notification(&credentials, &handle, attachment.path(), &message)
            .await;
        discard_attachment(attachment);
        match result {
            Ok(()) => NotifyOutcome::Edited(handle),
            Err(source) => NotifyOutcome::Failed(NotifyError::Edit { handle, source }),
        }
    }

    fn build_payload(
        &self,
        observation: &SessionObservation,
    ) -> Result<(TokenAttachment, String), NotifyError> {
        let records = observation.consolidated_tokens();
        let attachment = write_token_attachment(&records, self.attachment_dir.as_deref())?;
        tracing::debug!(
            tokens = records.len(),
            attachment = %attachment.path().display(),
            "wrote token attachment"
        );
        Ok((attachment, format_session_message(observation)))
    }
}

fn discard_attachment(attachment: TokenAttachment) {
    let path = attachment.path().to_path_buf();
    if let Err(error) = attachment.close() {
        tracing::warn!(
            attachment = %path.display(),
            error = %error,
            "failed to remove token attachment"
        );
    }
}
