//! Auth candidate extraction (spec §4.4 step 6).

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::entropy::is_high_entropy;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthCandidateKind {
    Bearer,
    Cookie,
    ApiKey,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthCandidate {
    pub kind: AuthCandidateKind,
    pub header: String,
    pub value: String,
    /// Populated when the value decodes as a JWT with an `exp` claim.
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

static COOKIE_SESSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(session|sess|sid|auth|token|jwt)").unwrap());

/// Canonical auth-bearing headers plus session-like cookie names (spec
/// §4.4 step 6 bullet 1).
pub fn extract_canonical(headers: &std::collections::BTreeMap<String, String>) -> Vec<AuthCandidate> {
    let mut found = Vec::new();
    for (name, value) in headers {
        let lower = name.to_lowercase();
        if lower == "authorization" {
            let expires_at = parse_jwt_exp(value.strip_prefix("Bearer ").unwrap_or(value));
            found.push(AuthCandidate {
                kind: AuthCandidateKind::Bearer,
                header: lower,
                value: value.clone(),
                expires_at,
            });
        } else if lower == "x-api-key" {
            found.push(AuthCandidate {
                kind: AuthCandidateKind::ApiKey,
                header: lower,
                value: value.clone(),
                expires_at: None,
            });
        } else if lower == "cookie" {
            for pair in value.split(';') {
                let pair = pair.trim();
                if let Some((name, val)) = pair.split_once('=') {
                    if COOKIE_SESSION_RE.is_match(name) {
                        found.push(AuthCandidate {
                            kind: AuthCandidateKind::Cookie,
                            header: format!("cookie:{name}"),
                            value: val.to_string(),
                            expires_at: None,
                        });
                    }
                }
            }
        }
    }
    found
}

/// High-entropy custom headers (spec §4.4 step 6 bullet 3).
pub fn extract_high_entropy(headers: &std::collections::BTreeMap<String, String>) -> Vec<AuthCandidate> {
    headers
        .iter()
        .filter(|(name, _)| {
            let lower = name.to_lowercase();
            lower != "authorization" && lower != "x-api-key" && lower != "cookie"
        })
        .filter(|(_, value)| is_high_entropy(value))
        .map(|(name, value)| AuthCandidate {
            kind: AuthCandidateKind::Custom,
            header: name.to_lowercase(),
            value: value.clone(),
            expires_at: None,
        })
        .collect()
}

/// If `value` splits into three base64url parts and the middle part
/// decodes to JSON with an `exp` claim, return it as a UTC timestamp.
pub fn parse_jwt_exp(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let claims: Value = serde_json::from_slice(&payload).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    chrono::DateTime::from_timestamp(exp, 0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OAuthSignal {
    pub token_endpoint: String,
    pub client_id: Option<String>,
    pub access_token: String,
}

static TOKEN_ENDPOINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(/oauth2?/token|/token$|securetoken)").unwrap());

/// OAuth detection (spec §4.4 step 6 bullet 4): token-endpoint URL shape
/// or an `access_token` string field in the response body.
pub fn detect_oauth(url: &str, request_body: Option<&Value>, response_body: Option<&Value>) -> Option<OAuthSignal> {
    let body = response_body?;
    let access_token = body.get("access_token")?.as_str()?.to_string();
    if !TOKEN_ENDPOINT_RE.is_match(url) && request_body.and_then(|b| b.get("grant_type")).is_none() {
        return None;
    }
    let client_id = extract_client_id(url, request_body);
    Some(OAuthSignal {
        token_endpoint: url.to_string(),
        client_id,
        access_token,
    })
}

fn extract_client_id(url: &str, request_body: Option<&Value>) -> Option<String> {
    if let Some(body) = request_body {
        if let Some(id) = body.get("client_id").and_then(|v| v.as_str()) {
            return Some(id.to_string());
        }
    }
    // Firebase `securetoken` shape keys its client id under the `key` query
    // parameter instead of the form body.
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == "key")
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn bearer_header_is_extracted() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc.def.ghi".to_string());
        let found = extract_canonical(&headers);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, AuthCandidateKind::Bearer);
    }

    #[test]
    fn session_cookie_is_extracted_plain_cookie_is_not() {
        let mut headers = BTreeMap::new();
        headers.insert("Cookie".to_string(), "sessionid=xyz; theme=dark".to_string());
        let found = extract_canonical(&headers);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].header, "cookie:sessionid");
    }

    #[test]
    fn high_entropy_custom_header_is_flagged() {
        let mut headers = BTreeMap::new();
        headers.insert("x-trace-signature".to_string(), "aZ9kLmN3pQrS7tUvWxYz01bC2dE4fG6h".to_string());
        let found = extract_high_entropy(&headers);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn access_token_in_body_yields_oauth_signal() {
        let response = json!({"access_token": "xyz", "token_type": "Bearer"});
        let signal = detect_oauth("https://auth.example.com/oauth2/token", None, Some(&response));
        assert!(signal.is_some());
        assert_eq!(signal.unwrap().access_token, "xyz");
    }

    #[test]
    fn unrelated_response_does_not_trigger_oauth() {
        let response = json!({"name": "alice"});
        assert!(detect_oauth("https://example.com/api/profile", None, Some(&response)).is_none());
    }
}
