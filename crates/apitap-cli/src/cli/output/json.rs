//! JSON rendering: serialize the value as-is, pretty-printed.

pub fn render(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
