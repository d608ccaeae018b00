//! Merges the token categories of one session into a single record set.
//!
//! Each category blob is parsed independently. Empty and `null` blobs are
//! skipped silently; malformed blobs are logged and skipped so the remaining
//! categories still contribute.

use thiserror::Error;

use crate::token_record::{normalize_token_collection_at, RawTokenCollection, TokenRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates the independent sources of raw token blobs.
pub enum TokenCategory {
    Session,
    Transport,
    Body,
    Custom,
}

impl TokenCategory {
    /// Fixed concatenation order used by consolidation.
    pub const ORDERED: [TokenCategory; 4] = [
        TokenCategory::Session,
        TokenCategory::Transport,
        TokenCategory::Body,
        TokenCategory::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Transport => "transport",
            Self::Body => "body",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to parse {} token blob: {source}", .category.as_str())]
/// A category blob that is not a `domain -> entry -> fields` mapping.
pub struct TokenParseError {
    pub category: TokenCategory,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Raw blob text for each category of one session; `None` means absent.
pub struct TokenBlobs<'a> {
    pub session: Option<&'a str>,
    pub transport: Option<&'a str>,
    pub body: Option<&'a str>,
    pub custom: Option<&'a str>,
}

impl<'a> TokenBlobs<'a> {
    pub fn get(&self, category: TokenCategory) -> Option<&'a str> {
        match category {
            TokenCategory::Session => self.session,
            TokenCategory::Transport => self.transport,
            TokenCategory::Body => self.body,
            TokenCategory::Custom => self.custom,
        }
    }
}

/// Parses one category blob. Returns `Ok(None)` for empty or `null` input.
pub fn parse_token_blob(
    category: TokenCategory,
    blob: &str,
) -> Result<Option<RawTokenCollection>, TokenParseError> {
    let trimmed = blob.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<RawTokenCollection>>(trimmed)
        .map_err(|source| TokenParseError { category, source })
}

/// Consolidates every category with a fixed expiry stamp.
pub fn consolidate_tokens_at(blobs: &TokenBlobs<'_>, expiration_date: i64) -> Vec<TokenRecord> {
    let mut records = Vec::new();
    for category in TokenCategory::ORDERED {
        let Some(blob) = blobs.get(category) else {
            continue;
        };
        match parse_token_blob(category, blob) {
            Ok(Some(raw)) if !raw.is_empty() => {
                let normalized = normalize_token_collection_at(&raw, expiration_date);
                tracing::debug!(
                    category = category.as_str(),
                    tokens = normalized.len(),
                    "normalized token category"
                );
                records.extend(normalized);
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(
                    category = category.as_str(),
                    error = %error,
                    "skipping malformed token blob"
                );
            }
        }
    }
    records
}

/// Consolidates every category, stamping each record to expire one year from now.
pub fn consolidate_tokens(blobs: &TokenBlobs<'_>) -> Vec<TokenRecord> {
    consolidate_tokens_at(blobs, herald_core::one_year_from_now_unix())
}

/// Convenience form taking the four blobs positionally; empty strings mean absent.
pub fn consolidate(session: &str, transport: &str, body: &str, custom: &str) -> Vec<TokenRecord> {
    consolidate_tokens(&TokenBlobs {
        session: Some(session),
        transport: Some(transport),
        body: Some(body),
        custom: Some(custom),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        consolidate, consolidate_tokens_at, parse_token_blob, TokenBlobs, TokenCategory,
    };

    const VALID_BODY: &str =
        r#"{".site.com": {"a": {"Name": "sid", "Value": "abc", "HostOnly": true}}}"#;

    #[test]
    fn unit_parse_token_blob_skips_empty_and_null() {
        assert!(parse_token_blob(TokenCategory::Session, "")
            .expect("empty")
            .is_none());
        assert!(parse_token_blob(TokenCategory::Session, "  null \n")
            .expect("null")
            .is_none());
    }

    #[test]
    fn unit_parse_token_blob_reports_category_on_shape_mismatch() {
        let error = parse_token_blob(TokenCategory::Body, r#"{"a.com": ["not", "a", "map"]}"#)
            .expect_err("shape mismatch");
        assert_eq!(error.category, TokenCategory::Body);
        assert!(error.to_string().starts_with("failed to parse body token blob"));
    }

    #[test]
    fn functional_consolidate_uses_only_the_parseable_blob() {
        let tokens = consolidate("", "null", VALID_BODY, "");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "sid");
        assert_eq!(tokens[0].domain, "site.com");
    }

    #[test]
    fn regression_malformed_first_blob_does_not_abort_consolidation() {
        let tokens = consolidate("{malformed", VALID_BODY, "", "");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, "abc");
    }

    #[test]
    fn functional_consolidate_concatenates_in_category_order() {
        let blobs = TokenBlobs {
            session: Some(r#"{"s.com": {"k": {"Name": "from-session"}}}"#),
            transport: Some(r#"{"t.com": {"k": {"Name": "from-transport"}}}"#),
            body: Some("{}"),
            custom: Some(r#"{"c.com": {"k": {"Name": "from-custom"}}}"#),
        };
        let names: Vec<String> = consolidate_tokens_at(&blobs, 1)
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["from-session", "from-transport", "from-custom"]);
    }

    #[test]
    fn functional_all_malformed_blobs_yield_empty_result() {
        let tokens = consolidate("{", "[1,2]", "\"text\"", "42");
        assert!(tokens.is_empty());
    }

    #[test]
    fn functional_consolidate_stamps_expiry_near_one_year_out() {
        let now = herald_core::current_unix_timestamp();
        let tokens = consolidate(VALID_BODY, "", "", "");
        let ahead = tokens[0].expiration_date - now;
        assert!((365 * 86_400..=366 * 86_400 + 5).contains(&ahead));
    }
}
