//! Browser-driven refresh (spec §4.6 step 2): spawn a browser, navigate to
//! the refresh URL, intercept outbound requests, and pull declared token
//! paths out of each intercepted body.
//!
//! The browser itself is an external collaborator (spec §6 lists it as an
//! out-of-scope adapter) — this module only defines the trait this
//! orchestrator drives and the plumbing that consumes its output.

use std::collections::HashMap;

use apitap_core::error::ApitapError;
use async_trait::async_trait;
use secrecy::SecretString;

/// One request the browser observed while navigating.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// Cookie observed in the browser's jar after navigation completes.
#[derive(Debug, Clone)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

/// External collaborator: drives an actual browser session. Implemented
/// outside this crate (spec §6); apitap-refresh only consumes it.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str, headless: bool) -> Result<(), ApitapError>;
    async fn intercepted_requests(&self) -> Vec<InterceptedRequest>;
    async fn cookies(&self) -> Vec<BrowserCookie>;
    /// Raw page text at the time navigation settled, used for captcha
    /// marker detection.
    async fn page_text(&self) -> String;
}

/// Pull `declared_paths` (dotted, e.g. `auth.access_token`) out of every
/// intercepted request body, returning the last value seen for each path.
pub fn extract_declared_tokens(
    requests: &[InterceptedRequest],
    declared_paths: &[String],
) -> HashMap<String, SecretString> {
    let mut found = HashMap::new();
    for request in requests {
        let Some(body) = &request.body else { continue };
        for path in declared_paths {
            if let Some(value) = lookup_dotted(body, path) {
                found.insert(path.clone(), SecretString::from(value));
            }
        }
    }
    found
}

fn lookup_dotted(value: &serde_json::Value, path: &str) -> Option<String> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    current.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_nested_declared_token() {
        let requests = vec![InterceptedRequest {
            url: "https://example.com/refresh".to_string(),
            body: Some(json!({"auth": {"access_token": "abc123"}})),
        }];
        let found = extract_declared_tokens(&requests, &["auth.access_token".to_string()]);
        assert!(found.contains_key("auth.access_token"));
    }

    #[test]
    fn missing_path_is_skipped() {
        let requests = vec![InterceptedRequest {
            url: "https://example.com/refresh".to_string(),
            body: Some(json!({"other": "value"})),
        }];
        let found = extract_declared_tokens(&requests, &["auth.access_token".to_string()]);
        assert!(found.is_empty());
    }
}
