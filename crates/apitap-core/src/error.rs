//! Shared error taxonomy.
//!
//! Every `apitap-*` crate returns this error (or wraps it via `#[from]`) so
//! that the CLI can map failures to exit codes and structured JSON without
//! knowing about each crate's internals. Categories follow spec §7: they
//! describe *behavior*, not implementation details.

use thiserror::Error;

/// Result type used across the workspace.
pub type Result<T> = std::result::Result<T, ApitapError>;

/// Top-level error taxonomy shared by every apitap crate.
///
/// Variants map 1:1 onto the error categories in spec §7 so that callers can
/// decide retry/refresh/exit-code behavior by matching on category alone.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApitapError {
    /// Unknown endpoint, domain, or skill file. Never retried; callers
    /// should receive a list of alternatives alongside this error.
    #[error("not found: {what}")]
    NotFound {
        what: String,
        alternatives: Vec<String>,
    },

    /// Bad URL, bad params, disallowed scheme, or an SSRF-blocked target.
    /// Fatal for the call; never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// DNS/connect/timeout/5xx. Callers may isolate this per-request in a
    /// batch; no implicit retry happens here except the single 401/403
    /// refresh-and-retry cycle owned by the replay engine.
    #[error("transient network error: {0}")]
    Transient(String),

    /// 401/403 that survived the refresh-and-retry cycle.
    #[error("authentication required for {domain}: {suggestion}")]
    Authentication { domain: String, suggestion: String },

    /// Signature mismatch, decryption failure, or a tampered skill file.
    /// Fails closed: importers reject, stores behave as if empty.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Session-table/capture-session caps reached, browser timeout, or a
    /// response too large to buffer even before truncation kicks in.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// Programmer error / invariant violation. Never expected at a
    /// component boundary; surfaced rather than panicking.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O failure reading or writing local state.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a skill file, credential record, or response body.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApitapError {
    pub fn not_found(what: impl Into<String>, alternatives: Vec<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            alternatives,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn authentication(domain: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Authentication {
            domain: domain.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The category name, used by the CLI's `--json` error envelope and by
    /// tests that assert on error shape without string-matching messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Transient(_) => "transient",
            Self::Authentication { .. } => "authentication",
            Self::Integrity(_) => "integrity",
            Self::Capacity(_) => "capacity",
            Self::Internal(_) => "internal",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}
