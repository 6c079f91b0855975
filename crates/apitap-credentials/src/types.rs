//! Credential data model (spec §3).

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A small closed set of auth kinds — spec §9 calls for a tagged union here,
/// not a trait-object hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    Bearer,
    Cookie,
    ApiKey,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAuth {
    #[serde(rename = "type")]
    pub kind: AuthKind,
    pub header: String,
    pub value: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PartialEq for StoredAuth {
    fn eq(&self, other: &Self) -> bool {
        use secrecy::ExposeSecret;
        self.kind == other.kind
            && self.header == other.header
            && self.value.expose_secret() == other.value.expose_secret()
            && self.expires_at == other.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub value: SecretString,
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A browser-context cookie-jar snapshot (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub cookies: Vec<CookieEntry>,
    pub saved_at: DateTime<Utc>,
    pub max_age_ms: i64,
}

impl StoredSession {
    pub const DEFAULT_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.saved_at);
        age.num_milliseconds() > self.max_age_ms
    }
}

/// Rotated in place on successful OAuth refresh.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OAuthCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<SecretString>,
}

/// Everything stored for one domain.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DomainRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<StoredAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<StoredSession>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tokens: HashMap<String, StoredToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthCredentials>,
}

/// The whole decrypted record: one blob, keyed by domain (spec §4.3, §6).
pub type CredentialRecords = HashMap<String, DomainRecord>;
