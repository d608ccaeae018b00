//! Normalized token records and the permissive decoder that produces them.
//!
//! Decoding never fails: each known field is read with its expected JSON type
//! and falls back to the zero value on absence or mismatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map for one raw token entry.
pub type RawTokenFields = Map<String, Value>;

/// Entries for one domain, keyed by an arbitrary entry key. `null` entries are kept
/// and decode to an all-default record.
pub type RawTokenEntries = BTreeMap<String, Option<RawTokenFields>>;

/// One raw token collection, `domain -> entry -> fields`. Ordered maps keep the
/// normalized output sorted by domain then entry key.
pub type RawTokenCollection = BTreeMap<String, Option<RawTokenEntries>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One normalized credential or cookie-like artifact.
pub struct TokenRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub host_only: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    pub session: bool,
    pub first_party_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<Value>,
    pub expiration_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Value>,
}

fn read_string(fields: &RawTokenFields, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn read_bool(fields: &RawTokenFields, key: &str) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn strip_leading_dot(domain: &str) -> &str {
    domain.strip_prefix('.').unwrap_or(domain)
}

/// Decodes one raw entry for `domain`. Any `expirationDate` present in the
/// source is discarded in favor of `expiration_date`.
pub fn normalize_token_entry(
    domain: &str,
    fields: &RawTokenFields,
    expiration_date: i64,
) -> TokenRecord {
    TokenRecord {
        name: read_string(fields, "Name"),
        value: read_string(fields, "Value"),
        domain: strip_leading_dot(domain).to_string(),
        host_only: read_bool(fields, "HostOnly"),
        path: read_string(fields, "Path"),
        secure: read_bool(fields, "Secure"),
        http_only: read_bool(fields, "HttpOnly"),
        same_site: read_string(fields, "SameSite"),
        session: read_bool(fields, "Session"),
        first_party_domain: read_string(fields, "FirstPartyDomain"),
        partition_key: fields.get("PartitionKey").cloned(),
        expiration_date,
        store_id: fields
            .get("storeId")
            .or_else(|| fields.get("StoreID"))
            .cloned(),
    }
}

/// Normalizes every entry of `raw` using a fixed expiry stamp.
pub fn normalize_token_collection_at(
    raw: &RawTokenCollection,
    expiration_date: i64,
) -> Vec<TokenRecord> {
    let empty = RawTokenFields::new();
    let mut records = Vec::new();
    for (domain, entries) in raw {
        let Some(entries) = entries else {
            continue;
        };
        for fields in entries.values() {
            let fields = fields.as_ref().unwrap_or(&empty);
            records.push(normalize_token_entry(domain, fields, expiration_date));
        }
    }
    records
}

/// Normalizes every entry of `raw`, stamping each record to expire one year from now.
pub fn normalize_token_collection(raw: &RawTokenCollection) -> Vec<TokenRecord> {
    normalize_token_collection_at(raw, herald_core::one_year_from_now_unix())
}

/// Renders records as the attachment body: a two-space indented JSON array.
pub fn render_token_attachment(records: &[TokenRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
