//! Session dedup state: which sessions were announced and under which message.
//!
//! `mark_if_first` is the only check-and-set in the system; exactly one caller
//! per session key observes `true`. Handles are written once, after the first
//! notification was created successfully.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::notify_channel::MessageHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One processed session and the message handle assigned to it, if any.
pub struct SessionStateEntry {
    pub session_id: String,
    pub message_id: Option<String>,
    pub has_handle: bool,
}

#[async_trait]
/// Trait contract for the per-session dedup record.
pub trait SessionStateStore: Send + Sync {
    /// Marks `session_key` processed. Returns `true` only for the first caller.
    async fn mark_if_first(&self, session_key: &str) -> bool;

    async fn get_handle(&self, session_key: &str) -> Option<MessageHandle>;

    async fn set_handle(&self, session_key: &str, handle: MessageHandle);

    /// Every processed session, numeric session ids in numeric order.
    async fn snapshot(&self) -> Vec<SessionStateEntry>;
}

#[derive(Debug, Default)]
struct SessionStateInner {
    processed: HashSet<String>,
    handles: HashMap<String, MessageHandle>,
}

/// Process-lifetime implementation guarded by a single lock.
#[derive(Debug, Default)]
pub struct InMemorySessionStateStore {
    inner: Mutex<SessionStateInner>,
}

impl InMemorySessionStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Numeric keys sort by value ahead of any non-numeric keys, which sort as strings.
fn session_order(left: &str, right: &str) -> Ordering {
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

#[async_trait]
impl SessionStateStore for InMemorySessionStateStore {
    async fn mark_if_first(&self, session_key: &str) -> bool {
        let mut inner = self.inner.lock().await;
        inner.processed.insert(session_key.to_string())
    }

    async fn get_handle(&self, session_key: &str) -> Option<MessageHandle> {
        let inner = self.inner.lock().await;
        inner.handles.get(session_key).cloned()
    }

    async fn set_handle(&self, session_key: &str, handle: MessageHandle) {
        let mut inner = self.inner.lock().await;
        inner.handles.insert(session_key.to_string(), handle);
    }

    async fn snapshot(&self) -> Vec<SessionStateEntry> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<SessionStateEntry> = inner
            .processed
            .iter()
            .map(|session_key| {
                let handle = inner.handles.get(session_key);
                SessionStateEntry {
                    session_id: session_key.clone(),
                    message_id: handle.map(|handle| handle.as_str().to_string()),
                    has_handle: handle.is_some(),
                }
            })
            .collect();
        drop(inner);
        entries.sort_by(|left, right| session_order(&left.session_id, &right.session_id));
        entries
    }
}
