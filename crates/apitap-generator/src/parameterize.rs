//! Path parameterization (spec §4.4 step 3, SPEC_FULL §C.4).
//!
//! Numeric IDs, UUIDs, ULIDs, and long opaque tokens collapse to `:id`;
//! human-readable segments (`users`, `latest`, `v2`) are left alone.

use once_cell::sync::Lazy;
use regex::Regex;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

static ULID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$").unwrap());

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Mixed-case-or-digit alphanumeric run of at least 20 chars — long enough
/// that it's almost certainly a generated token, not an English word.
static OPAQUE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").unwrap());

fn looks_like_opaque_token(segment: &str) -> bool {
    if !OPAQUE_TOKEN_RE.is_match(segment) {
        return false;
    }
    let has_digit = segment.bytes().any(|b| b.is_ascii_digit());
    let has_upper = segment.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = segment.bytes().any(|b| b.is_ascii_lowercase());
    has_digit || (has_upper && has_lower)
}

/// True if `segment` should become a `:id` placeholder.
pub fn is_parameterizable(segment: &str) -> bool {
    NUMERIC_RE.is_match(segment)
        || UUID_RE.is_match(segment)
        || ULID_RE.is_match(segment)
        || looks_like_opaque_token(segment)
}

/// Replace parameterizable path segments with `:id`, returning the
/// rewritten path and the original values in placeholder order (used to
/// seed `examples.request.url` defaults at replay time).
pub fn parameterize_path(path: &str) -> (String, Vec<String>) {
    let mut captured = Vec::new();
    let rewritten: Vec<String> = path
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                segment.to_string()
            } else if is_parameterizable(segment) {
                captured.push(segment.to_string());
                ":id".to_string()
            } else {
                segment.to_string()
            }
        })
        .collect();
    (rewritten.join("/"), captured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segment_is_parameterized() {
        let (path, captured) = parameterize_path("/users/1234/profile");
        assert_eq!(path, "/users/:id/profile");
        assert_eq!(captured, vec!["1234"]);
    }

    #[test]
    fn uuid_segment_is_parameterized() {
        let (path, _) = parameterize_path("/orders/550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(path, "/orders/:id");
    }

    #[test]
    fn human_segments_are_untouched() {
        let (path, captured) = parameterize_path("/v2/users/latest");
        assert_eq!(path, "/v2/users/latest");
        assert!(captured.is_empty());
    }

    #[test]
    fn opaque_token_segment_is_parameterized() {
        let (path, _) = parameterize_path("/sessions/aZ9kLmN3pQrS7tUvWxYz01");
        assert_eq!(path, "/sessions/:id");
    }

    #[test]
    fn short_word_is_not_opaque() {
        assert!(!is_parameterizable("latest"));
        assert!(!is_parameterizable("v2"));
    }
}
