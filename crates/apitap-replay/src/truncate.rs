//! Size-bounded truncation (spec §4.7 step 14, SPEC_FULL §C.8).
//!
//! Arrays trim from the tail; if the sole remaining element still exceeds
//! budget, its string fields truncate longest-first; objects truncate
//! fields the same way; strings binary-search the longest prefix that fits.

use serde_json::Value;

const MARKER: &str = "...[truncated]";

pub struct TruncationResult {
    pub value: Value,
    pub truncated: bool,
}

pub fn truncate_to_budget(value: Value, max_bytes: usize) -> TruncationResult {
    if serialized_len(&value) <= max_bytes {
        return TruncationResult { value, truncated: false };
    }
    let shrunk = shrink(value, max_bytes);
    TruncationResult { value: shrunk, truncated: true }
}

fn serialized_len(value: &Value) -> usize {
    serde_json::to_vec(value).map(|v| v.len()).unwrap_or(usize::MAX)
}

fn shrink(value: Value, max_bytes: usize) -> Value {
    match value {
        Value::Array(mut items) => {
            while items.len() > 1 && serialized_len(&Value::Array(items.clone())) > max_bytes {
                items.pop();
            }
            if items.len() == 1 && serialized_len(&Value::Array(items.clone())) > max_bytes {
                let sole = items.pop().unwrap();
                items.push(shrink_fields(sole, max_bytes.saturating_sub(2)));
            }
            Value::Array(items)
        }
        Value::Object(map) => Value::Object(shrink_object_fields(map, max_bytes)),
        Value::String(s) => Value::String(truncate_string(&s, max_bytes.saturating_sub(2))),
        other => other,
    }
}

fn shrink_fields(value: Value, max_bytes: usize) -> Value {
    match value {
        Value::Object(map) => Value::Object(shrink_object_fields(map, max_bytes)),
        Value::String(s) => Value::String(truncate_string(&s, max_bytes)),
        other => other,
    }
}

fn shrink_object_fields(mut map: serde_json::Map<String, Value>, max_bytes: usize) -> serde_json::Map<String, Value> {
    loop {
        let current_len = serialized_len(&Value::Object(map.clone()));
        if current_len <= max_bytes {
            break;
        }
        let Some((longest_key, _)) = map
            .iter()
            .filter(|(_, v)| matches!(v, Value::String(_)))
            .max_by_key(|(_, v)| serialized_len(v))
            .map(|(k, v)| (k.clone(), v.clone()))
        else {
            break; // nothing left that's truncatable
        };
        if let Some(Value::String(s)) = map.get(&longest_key) {
            let over_by = current_len - max_bytes;
            let target_len = s.len().saturating_sub(over_by + MARKER.len());
            map.insert(longest_key, Value::String(truncate_string(s, target_len)));
        } else {
            break;
        }
    }
    map
}

/// Binary search the largest `k` such that `s[..k] + MARKER` serializes
/// within `max_bytes`, cutting only on UTF-8 char boundaries.
pub fn truncate_string(s: &str, max_bytes: usize) -> String {
    if serde_json::to_vec(s).map(|v| v.len()).unwrap_or(usize::MAX) <= max_bytes {
        return s.to_string();
    }
    let mut lo = 0usize;
    let mut hi = s.len();
    let mut best = 0usize;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let boundary = floor_char_boundary(s, mid);
        let candidate = format!("{}{MARKER}", &s[..boundary]);
        if serde_json::to_vec(&candidate).map(|v| v.len()).unwrap_or(usize::MAX) <= max_bytes {
            best = boundary;
            if mid == hi {
                break;
            }
            lo = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            hi = mid - 1;
        }
    }
    format!("{}{MARKER}", &s[..best])
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn under_budget_is_unchanged() {
        let value = json!({"a": 1});
        let result = truncate_to_budget(value.clone(), 1000);
        assert!(!result.truncated);
        assert_eq!(result.value, value);
    }

    #[test]
    fn array_trims_from_tail() {
        let value = json!([{"x": 1}, {"x": 2}, {"x": 3}, {"x": 4}]);
        let result = truncate_to_budget(value, 20);
        assert!(result.truncated);
        assert!(result.value.as_array().unwrap().len() < 4);
    }

    #[test]
    fn string_gets_marker_suffix_when_truncated() {
        let long = "x".repeat(200);
        let truncated = truncate_string(&long, 50);
        assert!(truncated.ends_with(MARKER));
        assert!(truncated.len() <= 50 + MARKER.len());
    }

    #[test]
    fn truncation_respects_utf8_boundaries() {
        let s = "héllo".repeat(20);
        let truncated = truncate_string(&s, 30);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
    }
}
