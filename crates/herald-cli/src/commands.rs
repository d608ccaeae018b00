use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use herald_notify::{
    parse_session_observations, DiscordNotificationChannel, FileNotifierConfigSource,
    InMemorySessionStateStore, NotificationChannel, NotificationOrchestrator,
    NotificationTransport, NotifierConfig, NotifierConfigSource, NotifyOutcome,
    SessionObservation, SessionStateStore, TelegramNotificationChannel,
};
use herald_tokens::render_token_attachment;

pub(crate) fn build_channel(
    config: &NotifierConfig,
    transport: NotificationTransport,
) -> Result<Arc<dyn NotificationChannel>> {
    let channel: Arc<dyn NotificationChannel> = match transport {
        NotificationTransport::Telegram => Arc::new(TelegramNotificationChannel::new(
            &config.telegram_api_base,
            config.http_timeout_ms,
        )?),
        NotificationTransport::Discord => Arc::new(DiscordNotificationChannel::new(
            &config.discord_api_base,
            config.http_timeout_ms,
        )?),
    };
    Ok(channel)
}

pub(crate) async fn run_notify(
    config_path: &Path,
    observations_path: &Path,
    transport: Option<NotificationTransport>,
    report: bool,
) -> Result<()> {
    let config_source = Arc::new(FileNotifierConfigSource::new(config_path));
    let config = config_source.load_config()?;
    let transport = transport
        .or_else(|| config.preferred_transport())
        .ok_or_else(|| anyhow!("no notification channel is enabled in {}", config_path.display()))?;
    let channel = build_channel(&config, transport)?;

    let raw = std::fs::read_to_string(observations_path)
        .with_context(|| format!("failed to read {}", observations_path.display()))?;
    let observations = parse_session_observations(&raw)?;

    let state: Arc<dyn SessionStateStore> = Arc::new(InMemorySessionStateStore::new());
    let orchestrator =
        NotificationOrchestrator::new(channel, Arc::clone(&state), config_source);

    let mut failed = 0usize;
    for observation in &observations {
        if let NotifyOutcome::Failed(_) = orchestrator.notify(observation).await {
            failed += 1;
        }
    }
    tracing::info!(
        observations = observations.len(),
        failed,
        channel = transport.as_str(),
        "processed session observations"
    );

    if report {
        let snapshot = state.snapshot().await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

pub(crate) fn run_status(config_path: &Path) -> Result<()> {
    let config = FileNotifierConfigSource::new(config_path).load_config()?;
    println!("{}", serde_json::to_string_pretty(&config.status_summary())?);
    Ok(())
}

pub(crate) fn render_observation_attachment(raw: &str) -> Result<String> {
    let observation: SessionObservation =
        serde_json::from_str(raw).context("failed to parse session observation")?;
    Ok(render_token_attachment(&observation.consolidated_tokens())?)
}

pub(crate) fn run_consolidate(observation_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(observation_path)
        .with_context(|| format!("failed to read {}", observation_path.display()))?;
    println!("{}", render_observation_attachment(&raw)?);
    Ok(())
}
