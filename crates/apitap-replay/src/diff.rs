//! Contract diff against a stored `responseSchema` (spec §4.7 step 13):
//! missing fields are errors, new fields are info, type/nullability
//! changes are warnings.

use apitap_skillfile::SchemaNode;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    Error,
    Warn,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    pub path: String,
    pub severity: DriftSeverity,
    pub detail: String,
}

pub fn diff(expected: &SchemaNode, actual: &Value) -> Vec<DriftEntry> {
    let mut entries = Vec::new();
    walk(expected, actual, "$", &mut entries);
    entries
}

fn walk(expected: &SchemaNode, actual: &Value, path: &str, entries: &mut Vec<DriftEntry>) {
    let Some(expected_fields) = &expected.fields else { return };
    let Some(actual_obj) = actual.as_object() else {
        entries.push(DriftEntry {
            path: path.to_string(),
            severity: DriftSeverity::Warn,
            detail: "expected object, got a different shape".to_string(),
        });
        return;
    };

    for (key, expected_node) in expected_fields {
        let field_path = format!("{path}.{key}");
        match actual_obj.get(key) {
            None => entries.push(DriftEntry {
                path: field_path,
                severity: DriftSeverity::Error,
                detail: "field missing from response".to_string(),
            }),
            Some(actual_value) => {
                let actual_node = crate::schema_adapter::snapshot(actual_value);
                if actual_node.nullable != expected_node.nullable {
                    entries.push(DriftEntry {
                        path: field_path.clone(),
                        severity: DriftSeverity::Warn,
                        detail: format!("nullability changed (was {}, now {})", expected_node.nullable, actual_node.nullable),
                    });
                } else if actual_node.node_type != expected_node.node_type && !actual_value.is_null() {
                    entries.push(DriftEntry {
                        path: field_path.clone(),
                        severity: DriftSeverity::Warn,
                        detail: format!("type changed (was {:?}, now {:?})", expected_node.node_type, actual_node.node_type),
                    });
                } else {
                    walk(expected_node, actual_value, &field_path, entries);
                }
            }
        }
    }

    for key in actual_obj.keys() {
        if !expected_fields.contains_key(key) {
            entries.push(DriftEntry {
                path: format!("{path}.{key}"),
                severity: DriftSeverity::Info,
                detail: "new field not present at capture time".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_adapter::snapshot;
    use serde_json::json;

    #[test]
    fn missing_field_is_an_error() {
        let expected = snapshot(&json!({"id": 1, "name": "a"}));
        let actual = json!({"id": 1});
        let entries = diff(&expected, &actual);
        assert!(entries.iter().any(|e| e.severity == DriftSeverity::Error && e.path.ends_with("name")));
    }

    #[test]
    fn new_field_is_info() {
        let expected = snapshot(&json!({"id": 1}));
        let actual = json!({"id": 1, "extra": "x"});
        let entries = diff(&expected, &actual);
        assert!(entries.iter().any(|e| e.severity == DriftSeverity::Info && e.path.ends_with("extra")));
    }

    #[test]
    fn nullability_change_is_warn() {
        let expected = snapshot(&json!({"deleted_at": null}));
        let actual = json!({"deleted_at": "2024-01-01"});
        let entries = diff(&expected, &actual);
        assert!(entries.iter().any(|e| e.severity == DriftSeverity::Warn));
    }

    #[test]
    fn matching_shape_has_no_drift() {
        let expected = snapshot(&json!({"id": 1, "name": "a"}));
        let actual = json!({"id": 2, "name": "b"});
        assert!(diff(&expected, &actual).is_empty());
    }
}
