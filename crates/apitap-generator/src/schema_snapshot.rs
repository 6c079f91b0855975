//! Response-schema snapshot (spec §4.4 step 7): recursive walk, depth capped
//! at 5, object fields are the union of keys of the *first* sample only
//! (stable), arrays sample their first element, `null` marks nullability.

use apitap_skillfile::{SchemaNode, SchemaType};
use serde_json::Value;

pub const MAX_DEPTH: u32 = 5;

pub fn snapshot(value: &Value) -> SchemaNode {
    snapshot_at_depth(value, 0)
}

fn snapshot_at_depth(value: &Value, depth: u32) -> SchemaNode {
    if depth >= MAX_DEPTH {
        return SchemaNode {
            node_type: node_type(value),
            nullable: value.is_null(),
            fields: None,
            items: None,
        };
    }
    match value {
        Value::Null => SchemaNode {
            node_type: SchemaType::Null,
            nullable: true,
            fields: None,
            items: None,
        },
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(k, v)| (k.clone(), snapshot_at_depth(v, depth + 1)))
                .collect();
            SchemaNode {
                node_type: SchemaType::Object,
                nullable: false,
                fields: Some(fields),
                items: None,
            }
        }
        Value::Array(items) => SchemaNode {
            node_type: SchemaType::Array,
            nullable: false,
            fields: None,
            items: items.first().map(|first| Box::new(snapshot_at_depth(first, depth + 1))),
        },
        other => SchemaNode {
            node_type: node_type(other),
            nullable: false,
            fields: None,
            items: None,
        },
    }
}

fn node_type(value: &Value) -> SchemaType {
    match value {
        Value::Null => SchemaType::Null,
        Value::Bool(_) => SchemaType::Bool,
        Value::Number(_) => SchemaType::Number,
        Value::String(_) => SchemaType::String,
        Value::Array(_) => SchemaType::Array,
        Value::Object(_) => SchemaType::Object,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_fields_come_from_first_sample() {
        let snap = snapshot(&json!({"id": 1, "name": "a", "tags": ["x"]}));
        let fields = snap.fields.unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["tags"].node_type, SchemaType::Array);
    }

    #[test]
    fn null_marks_nullable() {
        let snap = snapshot(&json!({"deleted_at": null}));
        assert!(snap.fields.unwrap()["deleted_at"].nullable);
    }

    #[test]
    fn depth_is_capped() {
        let deep = json!({"a": {"a": {"a": {"a": {"a": {"a": "too deep"}}}}}});
        let snap = snapshot(&deep);
        let mut node = &snap;
        for _ in 0..MAX_DEPTH {
            node = node.fields.as_ref().unwrap().get("a").unwrap();
        }
        assert!(node.fields.is_none());
    }
}
