//! Foundational low-level utilities shared across Herald crates.
//!
//! Provides the token expiry stamp used by normalization and the identifier
//! masking used by status output.

pub mod secret_mask;
pub mod time_utils;

pub use secret_mask::mask_identifier;
pub use time_utils::{current_unix_timestamp, one_year_after_unix, one_year_from_now_unix};
