//! Response decoding and the auth-error envelope (spec §4.7 steps 11-12).

use serde_json::{json, Value};

pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("json"))
}

#[derive(Debug, Clone)]
pub enum DecodedBody {
    Json(Value),
    Text(String),
    Empty,
}

pub fn decode(content_type: Option<&str>, body: &[u8]) -> DecodedBody {
    if body.is_empty() {
        return DecodedBody::Empty;
    }
    if is_json_content_type(content_type) {
        if let Ok(value) = serde_json::from_slice(body) {
            return DecodedBody::Json(value);
        }
    }
    DecodedBody::Text(String::from_utf8_lossy(body).into_owned())
}

/// Wraps a 401/403 decoded body with a structured hint toward the auth
/// handoff (spec §4.7 step 12).
pub fn auth_error_envelope(domain: &str, decoded: &DecodedBody, suggestion: &str) -> Value {
    let original_response = match decoded {
        DecodedBody::Json(v) => v.clone(),
        DecodedBody::Text(t) => Value::String(t.clone()),
        DecodedBody::Empty => Value::Null,
    };
    json!({
        "error": "authentication_required",
        "suggestion": suggestion,
        "domain": domain,
        "originalResponse": original_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_decodes_body() {
        let decoded = decode(Some("application/json"), br#"{"ok":true}"#);
        assert!(matches!(decoded, DecodedBody::Json(_)));
    }

    #[test]
    fn non_json_content_type_is_text() {
        let decoded = decode(Some("text/html"), b"<html></html>");
        assert!(matches!(decoded, DecodedBody::Text(_)));
    }

    #[test]
    fn empty_body_is_empty() {
        let decoded = decode(Some("application/json"), b"");
        assert!(matches!(decoded, DecodedBody::Empty));
    }

    #[test]
    fn auth_envelope_carries_domain_and_suggestion() {
        let decoded = DecodedBody::Json(serde_json::json!({"message": "denied"}));
        let envelope = auth_error_envelope("api.example.com", &decoded, "run `apitap auth api.example.com`");
        assert_eq!(envelope["domain"], "api.example.com");
        assert_eq!(envelope["error"], "authentication_required");
    }
}
