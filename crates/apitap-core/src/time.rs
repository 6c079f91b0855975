//! Timestamp helpers shared by the skill store, credential store, and
//! replay engine's expiry checks.

use chrono::{DateTime, Utc};

/// Current UTC instant. Centralized so tests can be written against
/// explicit `DateTime<Utc>` values instead of sprinkling `Utc::now()`.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 timestamp, the format spec §3 requires for `capturedAt`.
pub fn now_iso8601() -> String {
    now().to_rfc3339()
}

/// `true` once `deadline` is within `horizon` of now (or already past).
///
/// Used for the proactive-refresh checks in spec §4.7.6: stored auth with
/// `expiresAt < now + 30s`, or a JWT with `exp < now + 30s`.
pub fn within_horizon(deadline: DateTime<Utc>, horizon: chrono::Duration) -> bool {
    deadline <= now() + horizon
}
