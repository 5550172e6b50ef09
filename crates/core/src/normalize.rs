//! Pre-write normalization
//!
//! Runs on every payload before validation:
//! - strings of `lowercase` fields (and string elements of `lowercase`
//!   arrays) are lowercased
//! - reference fields holding an expanded record (`{"_id": .., ...}`) are
//!   collapsed back to the identifier, so a client can send back what it read

use crate::record::ID_FIELD;
use crate::schema::{CollectionSchema, FieldKind, FieldSpec};
use serde_json::{Map, Value};

/// Normalize a payload in place
pub fn normalize(schema: &CollectionSchema, fields: &mut Map<String, Value>) {
    for (name, spec) in schema.fields() {
        if let Some(value) = fields.get_mut(name) {
            normalize_value(spec, value);
        }
    }
}

fn normalize_value(spec: &FieldSpec, value: &mut Value) {
    match &spec.kind {
        FieldKind::String if spec.lowercase => {
            if let Value::String(s) = value {
                if s.chars().any(char::is_uppercase) {
                    *s = s.to_lowercase();
                }
            }
        }
        FieldKind::ObjectId => {
            let id = match value {
                Value::Object(map) => map.get(ID_FIELD).cloned(),
                _ => None,
            };
            if let Some(id) = id {
                *value = id;
            }
        }
        FieldKind::Array(inner) => {
            if let Value::Array(items) = value {
                for item in items {
                    normalize_value(inner, item);
                }
            }
        }
        FieldKind::Object(members) => {
            if let Value::Object(map) = value {
                for (name, member) in members {
                    if let Some(v) = map.get_mut(name) {
                        normalize_value(member, v);
                    }
                }
            }
        }
        _ => {}
    }
}
