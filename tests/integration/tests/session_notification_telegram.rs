use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use herald_notify::{
    ChannelSettings, InMemorySessionStateStore, NotificationOrchestrator, NotifierConfig,
    NotifyOutcome, SessionObservation, SessionStateStore, StaticNotifierConfigSource,
    TelegramNotificationChannel,
};

fn telegram_orchestrator(
    server: &MockServer,
    attachment_dir: &tempfile::TempDir,
) -> (NotificationOrchestrator, Arc<InMemorySessionStateStore>) {
    let config = NotifierConfig {
        telegram: ChannelSettings {
            enabled: true,
            token: Some("test-token".to_string()),
            chat_id: Some("chat-1".to_string()),
        },
        telegram_api_base: server.base_url(),
        ..NotifierConfig::default()
    };
    let channel = TelegramNotificationChannel::new(&config.telegram_api_base, 5_000)
        .expect("telegram channel");
    let state = Arc::new(InMemorySessionStateStore::new());
    let orchestrator = NotificationOrchestrator::new(
        Arc::new(channel),
        Arc::clone(&state) as Arc<dyn SessionStateStore>,
        Arc::new(StaticNotifierConfigSource::new(config)),
    )
    .with_attachment_dir(attachment_dir.path());
    (orchestrator, state)
}

fn observation(username: &str, cookie_value: &str) -> SessionObservation {
    SessionObservation {
        id: 42,
        username: username.to_string(),
        password: "hunter2".to_string(),
        landing_url: "https://login.example.com/".to_string(),
        session_tokens: Some(json!({
            ".example.com": {"sid": {"Name": "sid", "Value": cookie_value, "Secure": true}}
        })),
        ..SessionObservation::default()
    }
}

#[tokio::test]
async fn integration_session_is_announced_once_then_edited_in_place() {
    let server = MockServer::start();
    let created = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendDocument")
            .body_includes("alice@example.com")
            .body_includes("\"value\": \"first-cookie\"");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 555}}));
    });
    let edited = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/editMessageMedia")
            .body_includes("555")
            .body_includes("\"value\": \"second-cookie\"");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 555}}));
    });
    let attachment_dir = tempfile::tempdir().expect("tempdir");
    let (orchestrator, state) = telegram_orchestrator(&server, &attachment_dir);

    let first = orchestrator
        .notify(&observation("alice@example.com", "first-cookie"))
        .await;
    let second = orchestrator
        .notify(&observation("alice@example.com", "second-cookie"))
        .await;

    assert!(matches!(first, NotifyOutcome::Created(_)));
    assert!(matches!(second, NotifyOutcome::Edited(ref handle) if handle.as_str() == "555"));
    created.assert_calls(1);
    edited.assert_calls(1);

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].session_id, "42");
    assert_eq!(snapshot[0].message_id.as_deref(), Some("555"));
    assert_eq!(
        std::fs::read_dir(attachment_dir.path())
            .expect("read dir")
            .count(),
        0
    );
}

#[tokio::test]
async fn integration_rejected_create_drops_later_updates() {
    let server = MockServer::start();
    let created = server.mock(|when, then| {
        when.method(POST).path("/bottest-token/sendDocument");
        then.status(403)
            .json_body(json!({"ok": false, "description": "Forbidden: bot was blocked"}));
    });
    let edited = server.mock(|when, then| {
        when.method(POST).path("/bottest-token/editMessageMedia");
        then.status(200).json_body(json!({"ok": true}));
    });
    let attachment_dir = tempfile::tempdir().expect("tempdir");
    let (orchestrator, state) = telegram_orchestrator(&server, &attachment_dir);

    let first = orchestrator.notify(&observation("bob", "a")).await;
    let second = orchestrator.notify(&observation("bob", "b")).await;

    assert!(matches!(first, NotifyOutcome::Failed(_)));
    assert!(matches!(second, NotifyOutcome::DroppedMissingHandle));
    created.assert_calls(1);
    edited.assert_calls(0);
    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert!(!snapshot[0].has_handle);
}
