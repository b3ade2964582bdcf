//! Request body templates and the key-directed merge used to fill them.

use serde_json::{json, Map, Value};

/// Content type of form-encoded request bodies
pub const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Content type of JSON request and response bodies
pub const APPLICATION_JSON: &str = "application/json";

/// Wrapper for a form-encoded object body; fill `schema` and/or `properties`.
pub fn url_encoded_template() -> Value {
    json!({
        "required": true,
        "content": {
            URL_ENCODED: {
                "schema": {
                    "type": "object",
                    "properties": {}
                }
            }
        }
    })
}

/// Wrapper for a JSON body described by a model reference; fill `$ref`.
pub fn json_reference_template() -> Value {
    json!({
        "content": {
            APPLICATION_JSON: {
                "schema": {
                    "$ref": ""
                }
            }
        }
    })
}

/// Returns a copy of `value` where every value bound to `key`, at any depth,
/// is replaced by `replacement`.
///
/// Replacements are not searched again, and everything else is copied as is.
pub fn replace_key(value: &Value, key: &str, replacement: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if k == key {
                        replacement.clone()
                    } else {
                        replace_key(v, key, replacement)
                    };
                    (k.clone(), v)
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| replace_key(item, key, replacement))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Adds the `content` entries of `other` to `target`, creating `content` when missing.
///
/// Top-level keys other than `content` are copied from `other` only when absent from `target`.
pub fn merge_content(target: &mut Value, other: &Value) {
    let (Some(target), Some(other)) = (target.as_object_mut(), other.as_object()) else {
        return;
    };

    for (key, value) in other {
        match (key.as_str(), target.get_mut(key)) {
            ("content", Some(Value::Object(content))) => {
                if let Some(entries) = value.as_object() {
                    for (media_type, media) in entries {
                        content.insert(media_type.clone(), media.clone());
                    }
                }
            }
            (_, Some(_)) => {}
            (_, None) => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
