//! Post-read reference expansion
//!
//! A collection lists the reference fields it expands on read (its
//! `populate` list). Expansion replaces each identifier with the referenced
//! record rendered as a document. Lookups go through a resolver closure so
//! this stage stays independent of any store.

use crate::id::RecordId;
use crate::schema::{CollectionSchema, FieldKind, FieldSpec};
use serde_json::Value;

/// Collection a reference field points into
///
/// Works for single references and arrays of references.
pub fn reference_target(spec: &FieldSpec) -> Option<&str> {
    match &spec.kind {
        FieldKind::ObjectId => spec.reference.as_deref(),
        FieldKind::Array(inner) => reference_target(inner),
        _ => None,
    }
}

/// Expand the populated references of a rendered document
///
/// `resolve(collection, id)` returns the rendered target or None if it does
/// not exist. Dangling single references become `null`; dangling array
/// elements are dropped.
pub fn expand_references<F>(schema: &CollectionSchema, doc: &mut Value, mut resolve: F)
where
    F: FnMut(&str, &RecordId) -> Option<Value>,
{
    let Value::Object(map) = doc else {
        return;
    };

    for field in schema.populate_fields() {
        let Some(spec) = schema.field_spec(field) else {
            continue;
        };
        let Some(target) = reference_target(spec) else {
            continue;
        };
        let Some(value) = map.get_mut(field.as_str()) else {
            continue;
        };

        match value {
            Value::String(id) => {
                let id = RecordId::new(id.as_str());
                *value = resolve(target, &id).unwrap_or(Value::Null);
            }
            Value::Array(items) => {
                let expanded: Vec<Value> = items
                    .drain(..)
                    .filter_map(|item| match item {
                        Value::String(id) => resolve(target, &RecordId::new(id)),
                        other => Some(other),
                    })
                    .collect();
                *items = expanded;
            }
            _ => {}
        }
    }
}
