//! Concurrent writers and the revision check

use crate::common::*;
use galaxy::{DocumentStore, MemoryStore, Record, RecordId};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_patches_never_lose_updates() {
    let executor = Arc::new(create_executor());
    let id = create_id(&executor, "resources", json!({"title": "T", "url": "http://x"}));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let executor = Arc::clone(&executor);
            let id = id.clone();
            thread::spawn(move || {
                patch(
                    &executor,
                    "resources",
                    &id,
                    json!([{"op": "add", "path": "/tags/-", "value": format!("t{i}")}]),
                )
                .status
                .as_u16()
            })
        })
        .collect();
    let statuses: Vec<u16> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(statuses.iter().all(|s| *s == 200 || *s == 409), "{statuses:?}");
    let applied = statuses.iter().filter(|s| **s == 200).count();
    assert!(applied >= 1);

    let doc = get(&executor, "resources", &id).body.unwrap();
    assert_eq!(doc["tags"].as_array().unwrap().len(), applied);
    assert_eq!(doc["__v"], applied as u64);
}

/// Store that sneaks in a competing write before every revision-checked write
struct RacingStore {
    inner: MemoryStore,
}

impl DocumentStore for RacingStore {
    fn define_collection(
        &self,
        collection: &str,
        unique: Vec<galaxy::UniqueField>,
    ) -> galaxy_core::Result<()> {
        self.inner.define_collection(collection, unique)
    }
    fn find_all(&self, collection: &str) -> galaxy_core::Result<Vec<Record>> {
        self.inner.find_all(collection)
    }
    fn find_by_id(&self, collection: &str, id: &RecordId) -> galaxy_core::Result<Option<Record>> {
        self.inner.find_by_id(collection, id)
    }
    fn insert(&self, collection: &str, fields: Map<String, Value>) -> galaxy_core::Result<Record> {
        self.inner.insert(collection, fields)
    }
    fn replace_or_insert(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> galaxy_core::Result<(Record, bool)> {
        self.inner.replace_or_insert(collection, id, fields)
    }
    fn replace_if_revision(
        &self,
        collection: &str,
        id: &RecordId,
        expected: u64,
        fields: Map<String, Value>,
    ) -> galaxy_core::Result<Record> {
        if let Some(current) = self.inner.find_by_id(collection, id)? {
            self.inner
                .replace_or_insert(collection, id, current.fields.clone())?;
        }
        self.inner.replace_if_revision(collection, id, expected, fields)
    }
    fn remove(&self, collection: &str, id: &RecordId) -> galaxy_core::Result<Option<Record>> {
        self.inner.remove(collection, id)
    }
    fn count(&self, collection: &str) -> galaxy_core::Result<usize> {
        self.inner.count(collection)
    }
}

#[test]
fn lost_race_is_a_conflict() {
    let executor = create_executor_on(Arc::new(RacingStore {
        inner: MemoryStore::new(),
    }));
    let id = create_id(&executor, "resources", json!({"title": "T", "url": "http://x"}));

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "replace", "path": "/title", "value": "Mine"}]),
    );
    assert_eq!(response.status.as_u16(), 409);
    let body = response.body_or_null();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["details"], json!({"expected": 0, "actual": 1}));

    assert_eq!(get(&executor, "resources", &id).body_or_null()["title"], "T");
}
