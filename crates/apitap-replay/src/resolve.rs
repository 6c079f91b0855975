//! Request assembly (spec §4.7 steps 2-5): path placeholders, query
//! string, header filtering/injection, and body templating.

use std::collections::BTreeMap;

use apitap_core::error::ApitapError;
use apitap_credentials::CredentialStore;
use apitap_skillfile::{BodyTemplate, HeaderValue, SkillEndpoint};
use secrecy::ExposeSecret;

/// Headers never forwarded from the captured sample (spec §4.7 step 4):
/// hop-by-hop, proxying, and anything the engine injects fresh itself.
fn is_blocked_header(name: &str) -> bool {
    let lower = name.to_lowercase();
    matches!(
        lower.as_str(),
        "host" | "cookie" | "set-cookie" | "authorization" | "connection" | "keep-alive"
            | "transfer-encoding" | "upgrade" | "te" | "trailer"
    ) || lower.starts_with("proxy-")
        || lower.starts_with("sec-")
        || lower.starts_with("x-forwarded-")
}

/// Substitute every `:name` placeholder in `endpoint.path`. Caller-provided
/// `params` take precedence; otherwise the same segment is parsed out of
/// the captured `examples.request.url` as a default. An unsubstituted
/// placeholder is a caller error.
pub fn resolve_path(endpoint: &SkillEndpoint, params: &BTreeMap<String, String>) -> Result<String, ApitapError> {
    let default_segments = default_path_segments(endpoint);

    let mut resolved_segments = Vec::new();
    let mut placeholder_index = 0usize;
    for segment in endpoint.path.split('/') {
        if let Some(name) = segment.strip_prefix(':') {
            let value = params
                .get(name)
                .cloned()
                .or_else(|| default_segments.get(placeholder_index).cloned())
                .ok_or_else(|| ApitapError::validation(format!("missing value for path placeholder :{name}")))?;
            resolved_segments.push(value);
            placeholder_index += 1;
        } else {
            resolved_segments.push(segment.to_string());
        }
    }
    Ok(resolved_segments.join("/"))
}

fn default_path_segments(endpoint: &SkillEndpoint) -> Vec<String> {
    let Ok(example) = url::Url::parse(&endpoint.examples.request.url) else {
        return Vec::new();
    };
    let example_segments: Vec<&str> = example.path().split('/').collect();
    let pattern_segments: Vec<&str> = endpoint.path.split('/').collect();
    pattern_segments
        .iter()
        .zip(example_segments.iter())
        .filter(|(pattern, _)| pattern.starts_with(':'))
        .map(|(_, value)| value.to_string())
        .collect()
}

/// Assemble the query string: captured defaults, overridden by caller
/// params that aren't path placeholders or dotted body paths.
pub fn resolve_query(
    endpoint: &SkillEndpoint,
    params: &BTreeMap<String, String>,
    path_param_names: &[String],
) -> Vec<(String, String)> {
    let mut query: BTreeMap<String, String> =
        endpoint.query_params.iter().map(|(k, v)| (k.clone(), v.example.clone())).collect();

    for (key, value) in params {
        if path_param_names.contains(key) {
            continue;
        }
        if key.contains('.') {
            continue; // dotted body-variable path, handled by resolve_body
        }
        query.insert(key.clone(), value.clone());
    }
    query.into_iter().collect()
}

pub fn path_placeholder_names(endpoint: &SkillEndpoint) -> Vec<String> {
    endpoint
        .path
        .split('/')
        .filter_map(|segment| segment.strip_prefix(':').map(str::to_string))
        .collect()
}

/// Filter blocked headers, then inject fresh auth from the credential
/// store (with parent-domain fallback unless `isolatedAuth` is set) and
/// resolve every `[stored]` placeholder — never emitting the sentinel
/// itself (spec §8 "never send `[stored]` literally").
pub fn resolve_headers(
    endpoint: &SkillEndpoint,
    domain: &str,
    credentials: Option<&CredentialStore>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    for (name, value) in &endpoint.headers {
        if is_blocked_header(name) {
            continue;
        }
        match value {
            HeaderValue::Concrete(v) => {
                headers.insert(name.clone(), v.clone());
            }
            HeaderValue::Stored => {
                if let Some(resolved) = resolve_stored_header(name, endpoint, domain, credentials) {
                    headers.insert(name.clone(), resolved);
                }
                // else: drop it — never send the literal "[stored]"
            }
        }
    }

    if let Some(store) = credentials {
        let auth = if endpoint.isolated_auth {
            store.retrieve(domain)
        } else {
            store.retrieve_with_fallback(domain)
        };
        if let Some(auth) = auth {
            headers.insert(auth.header, auth.value.expose_secret().to_string());
        }
    }

    headers
}

fn resolve_stored_header(
    header_name: &str,
    endpoint: &SkillEndpoint,
    domain: &str,
    credentials: Option<&CredentialStore>,
) -> Option<String> {
    let store = credentials?;
    let auth = if endpoint.isolated_auth { store.retrieve(domain) } else { store.retrieve_with_fallback(domain) }?;
    if auth.header.eq_ignore_ascii_case(header_name) {
        Some(auth.value.expose_secret().to_string())
    } else {
        None
    }
}

/// Substitute declared body-variable paths with caller params and
/// `refreshableTokens` with stored token values, serializing the result.
pub fn resolve_body(
    endpoint: &SkillEndpoint,
    domain: &str,
    params: &BTreeMap<String, String>,
    credentials: Option<&CredentialStore>,
) -> Option<serde_json::Value> {
    let spec = endpoint.request_body.as_ref()?;
    let tokens = credentials.map(|c| c.retrieve_tokens(domain)).unwrap_or_default();
    Some(substitute(&spec.template, params, &tokens))
}

fn substitute(
    template: &BodyTemplate,
    params: &BTreeMap<String, String>,
    tokens: &std::collections::HashMap<String, apitap_credentials::StoredToken>,
) -> serde_json::Value {
    match template {
        BodyTemplate::Object(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), substitute(v, params, tokens))).collect())
        }
        BodyTemplate::Array(items) => serde_json::Value::Array(items.iter().map(|v| substitute(v, params, tokens)).collect()),
        BodyTemplate::Scalar(serde_json::Value::String(s)) => {
            if let Some(path) = s.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
                if let Some(token) = tokens.get(path) {
                    return serde_json::Value::String(token.value.expose_secret().to_string());
                }
                if let Some(value) = params.get(path) {
                    return serde_json::Value::String(value.clone());
                }
                return serde_json::Value::Null;
            }
            serde_json::Value::String(s.clone())
        }
        BodyTemplate::Scalar(other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitap_skillfile::{EndpointExamples, ExampleRequest, QueryParamSpec, Replayability, ReplayabilityTier, ResponseShape};

    fn endpoint_with_path(path: &str, example_url: &str) -> SkillEndpoint {
        SkillEndpoint {
            id: "get:x".to_string(),
            method: "GET".to_string(),
            path: path.to_string(),
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            response_shape: ResponseShape { shape_type: "object".to_string(), fields: None },
            response_schema: None,
            examples: EndpointExamples { request: ExampleRequest { url: example_url.to_string() }, response: None },
            request_body: None,
            replayability: Replayability { tier: ReplayabilityTier::Green, verified: false, signals: vec![] },
            pagination: None,
            isolated_auth: false,
        }
    }

    #[test]
    fn caller_param_fills_placeholder() {
        let endpoint = endpoint_with_path("/users/:id", "https://api.example.com/users/1");
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), "42".to_string());
        assert_eq!(resolve_path(&endpoint, &params).unwrap(), "/users/42");
    }

    #[test]
    fn falls_back_to_example_url_segment() {
        let endpoint = endpoint_with_path("/users/:id", "https://api.example.com/users/7");
        let params = BTreeMap::new();
        assert_eq!(resolve_path(&endpoint, &params).unwrap(), "/users/7");
    }

    #[test]
    fn missing_placeholder_without_default_is_an_error() {
        let endpoint = endpoint_with_path("/users/:id", "https://api.example.com/nope");
        let params = BTreeMap::new();
        assert!(resolve_path(&endpoint, &params).is_err());
    }

    #[test]
    fn blocked_headers_are_dropped() {
        let mut endpoint = endpoint_with_path("/x", "https://api.example.com/x");
        endpoint.headers.insert("cookie".to_string(), HeaderValue::Concrete("a=b".to_string()));
        endpoint.headers.insert("x-custom".to_string(), HeaderValue::Concrete("ok".to_string()));
        let headers = resolve_headers(&endpoint, "api.example.com", None);
        assert!(!headers.contains_key("cookie"));
        assert_eq!(headers.get("x-custom"), Some(&"ok".to_string()));
    }

    #[test]
    fn unresolved_stored_header_is_dropped_not_sent_literally() {
        let mut endpoint = endpoint_with_path("/x", "https://api.example.com/x");
        endpoint.headers.insert("x-api-key".to_string(), HeaderValue::Stored);
        let headers = resolve_headers(&endpoint, "api.example.com", None);
        assert!(headers.values().all(|v| v != "[stored]"));
        assert!(!headers.contains_key("x-api-key"));
    }
}
