//! Session notification runtime for Herald.
//!
//! Provides the session dedup state, token attachment builder, channel
//! adapters (Telegram, Discord) and the orchestrator that decides whether an
//! observation creates a new notification or edits an existing one.
//!
//! ```rust
//! use herald_notify::{format_session_message, SessionObservation};
//!
//! let observation = SessionObservation {
//!     id: 42,
//!     username: "operator".to_string(),
//!     ..SessionObservation::default()
//! };
//! assert_eq!(observation.session_key(), "42");
//! assert!(format_session_message(&observation).contains("operator"));
//! ```

pub mod notify_attachment;
pub mod notify_channel;
pub mod notify_config;
pub mod notify_discord;
pub mod notify_message;
pub mod notify_orchestrator;
pub mod notify_telegram;
pub mod session_observation;
pub mod session_state;

pub use notify_attachment::*;
pub use notify_channel::*;
pub use notify_config::*;
pub use notify_discord::*;
pub use notify_message::*;
pub use notify_orchestrator::*;
pub use notify_telegram::*;
pub use session_observation::*;
pub use session_state::*;
