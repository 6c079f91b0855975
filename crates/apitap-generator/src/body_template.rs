//! Builds a [`BodyTemplate`] tree from a captured JSON body, substituting
//! the dotted paths flagged dynamic by [`crate::body_vars`] with
//! `"{{path}}"` placeholders (spec §4.4 step 9's sibling for bodies, rather
//! than header rewriting).

use apitap_skillfile::BodyTemplate;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub fn build(body: &Value, variables: &BTreeSet<String>) -> BodyTemplate {
    build_at(body, "", variables)
}

fn build_at(value: &Value, path: &str, variables: &BTreeSet<String>) -> BodyTemplate {
    if variables.contains(path) {
        return BodyTemplate::Scalar(Value::String(format!("{{{{{path}}}}}")));
    }
    match value {
        Value::Object(map) => {
            let mut out = BTreeMap::new();
            for (key, v) in map {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                out.insert(key.clone(), build_at(v, &child_path, variables));
            }
            BodyTemplate::Object(out)
        }
        Value::Array(items) => {
            let child_path = format!("{path}[]");
            BodyTemplate::Array(items.iter().map(|v| build_at(v, &child_path, variables)).collect())
        }
        other => BodyTemplate::Scalar(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flagged_field_becomes_placeholder() {
        let body = json!({"user_id": 42, "name": "alice"});
        let mut vars = BTreeSet::new();
        vars.insert("user_id".to_string());
        let template = build(&body, &vars);
        match template {
            BodyTemplate::Object(map) => {
                assert_eq!(map["user_id"], BodyTemplate::Scalar(json!("{{user_id}}")));
                assert_eq!(map["name"], BodyTemplate::Scalar(json!("alice")));
            }
            _ => panic!("expected object"),
        }
    }
}
