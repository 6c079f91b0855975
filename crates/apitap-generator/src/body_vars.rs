//! Body variable detection (spec §4.4 step 5): value-shape, key-name, and
//! cross-request diff, unioned into one set of dotted field paths.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::parameterize::is_parameterizable;

static DYNAMIC_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(timestamp|ts|created_?at|updated_?at|expires?_?at|cursor|next_?(token|cursor)|request_?id|req_?id|trace_?id|idempotency_?key|csrf_?token|session_?token|xsrf|nonce|lat(itude)?|lon(g|gitude)?|geo|query|q|search|filter|page|page_?number|page_?size|offset)$",
    )
    .unwrap()
});

fn key_name_is_dynamic(key: &str) -> bool {
    DYNAMIC_KEY_RE.is_match(key)
}

fn value_shape_is_dynamic(value: &Value) -> bool {
    match value {
        Value::String(s) => is_parameterizable(s) || crate::entropy::is_high_entropy(s),
        Value::Number(n) => n.is_i64() || n.is_u64(),
        _ => false,
    }
}

/// Walk one captured body, collecting dotted paths flagged dynamic by
/// value-shape or key-name heuristics.
pub fn detect_static(body: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    walk(body, String::new(), &mut found);
    found
}

fn walk(value: &Value, prefix: String, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                if key_name_is_dynamic(key) || value_shape_is_dynamic(v) {
                    found.insert(path.clone());
                }
                walk(v, path, found);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                walk(first, format!("{prefix}[]"), found);
            }
        }
        _ => {}
    }
}

/// Cross-request diff (spec §4.4 step 5, applied during merge into an
/// existing endpoint): fields that changed value between two samples of
/// the same endpoint are dynamic too. Arrays differing in length are
/// dynamic wholesale; same-length arrays diff element-wise.
pub fn diff_samples(first: &Value, second: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    diff(first, second, String::new(), &mut found);
    found
}

fn diff(a: &Value, b: &Value, prefix: String, found: &mut BTreeSet<String>) {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            for (key, va) in ma {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                match mb.get(key) {
                    Some(vb) => diff(va, vb, path, found),
                    None => {
                        found.insert(path);
                    }
                }
            }
        }
        (Value::Array(aa), Value::Array(ab)) => {
            let path = format!("{prefix}[]");
            if aa.len() != ab.len() {
                found.insert(path);
            } else if let (Some(ea), Some(eb)) = (aa.first(), ab.first()) {
                diff(ea, eb, path, found);
            }
        }
        _ if a != b => {
            found.insert(if prefix.is_empty() { "$".to_string() } else { prefix });
        }
        _ => {}
    }
}

/// Union of all three detection strategies across every sample captured
/// for one endpoint.
pub fn detect_variables(samples: &[Value]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for sample in samples {
        found.extend(detect_static(sample));
    }
    for window in samples.windows(2) {
        found.extend(diff_samples(&window[0], &window[1]));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_value_is_dynamic() {
        let body = json!({"user_id": 42, "name": "alice"});
        let found = detect_static(&body);
        assert!(found.contains("user_id"));
        assert!(!found.contains("name"));
    }

    #[test]
    fn dynamic_key_name_is_flagged_even_with_static_value() {
        let body = json!({"csrf_token": "fixed", "action": "submit"});
        let found = detect_static(&body);
        assert!(found.contains("csrf_token"));
        assert!(!found.contains("action"));
    }

    #[test]
    fn changed_field_between_samples_is_dynamic() {
        let first = json!({"comment": "hello", "post_id": "fixed-post"});
        let second = json!({"comment": "world", "post_id": "fixed-post"});
        let found = diff_samples(&first, &second);
        assert!(found.contains("comment"));
        assert!(!found.contains("post_id"));
    }

    #[test]
    fn array_length_change_marks_whole_array_dynamic() {
        let first = json!({"tags": ["a"]});
        let second = json!({"tags": ["a", "b"]});
        let found = diff_samples(&first, &second);
        assert!(found.contains("tags[]"));
    }
}
