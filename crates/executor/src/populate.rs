//! Post-read rendering
//!
//! Turns stored records into the documents clients see: bookkeeping under
//! reserved names, hidden fields removed, account views attached, and the
//! collection's reference fields expanded one level deep from the store.

use galaxy_core::credentials;
use galaxy_core::{expand_references, CollectionSchema, Record, Result, SchemaRegistry};
use galaxy_store::DocumentStore;
use serde_json::Value;

/// Render a record for clients, without expansion
pub fn render(schema: &CollectionSchema, record: &Record) -> Value {
    let mut doc = record.to_document(schema.has_timestamps());
    if let Value::Object(map) = &mut doc {
        for hidden in schema.hidden_fields() {
            map.remove(hidden);
        }
    }
    if schema.has_credentials() {
        let profile = credentials::profile(&doc);
        let token = credentials::token(&doc);
        if let Value::Object(map) = &mut doc {
            map.insert("profile".to_string(), profile);
            map.insert("token".to_string(), token);
        }
    }
    doc
}

/// Expand the populated references of a rendered document from the store
///
/// Referenced records are rendered with their own collection's schema but
/// are not expanded further. A store failure aborts the expansion.
pub fn populate(
    doc: &mut Value,
    schema: &CollectionSchema,
    store: &dyn DocumentStore,
    registry: &SchemaRegistry,
) -> Result<()> {
    if schema.populate_fields().is_empty() {
        return Ok(());
    }

    let mut failure = None;
    expand_references(schema, doc, |target, id| {
        if failure.is_some() {
            return None;
        }
        match store.find_by_id(target, id) {
            Ok(found) => found.map(|record| match registry.get(target) {
                Some(target_schema) => render(target_schema, &record),
                None => record.to_document(false),
            }),
            Err(e) => {
                failure = Some(e);
                None
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
