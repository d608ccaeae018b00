//! Token normalization and consolidation for captured sessions.
//!
//! Raw token collections arrive as loosely typed `domain -> entry -> fields`
//! JSON blobs from up to four independent categories. Normalization turns one
//! collection into flat [`TokenRecord`] values; consolidation merges every
//! category for a session while tolerating malformed blobs.
//!
//! ```rust
//! use herald_tokens::consolidate;
//!
//! let body = r#"{".site.com": {"a": {"Name": "sid", "Value": "abc", "HostOnly": true}}}"#;
//! let tokens = consolidate("", "null", body, "");
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].domain, "site.com");
//! assert!(tokens[0].host_only);
//! ```

pub mod token_consolidation;
pub mod token_record;

pub use token_consolidation::*;
pub use token_record::*;
