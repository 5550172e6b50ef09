//! Error mapping, including store failures

use crate::common::*;
use galaxy::{Command, DocumentStore, MemoryStore, Record, RecordId};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn unknown_collection_is_404_with_body() {
    let executor = create_executor();
    let response = list(&executor, "widgets");
    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.body_or_null()["error"], "collection_not_found");
}

#[test]
fn undecodable_command_is_400() {
    let executor = create_executor();
    let response = executor.respond_json(r#"{"Get": {"collection": "resources"}}"#);
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["error"], "invalid_input");
}

#[test]
fn commands_round_trip_through_json() {
    let cmd = Command::Upsert {
        collection: "cohorts".into(),
        id: RecordId::new("c1"),
        payload: json!({"name": "Spring"}),
    };
    let line = serde_json::to_string(&cmd).unwrap();
    let executor = create_executor();
    assert_eq!(executor.respond_json(&line).status.as_u16(), 200);
}

/// Store that fails every call once switched off
struct FlakyStore {
    inner: MemoryStore,
    down: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> galaxy_core::Result<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(galaxy_core::Error::store("connection refused"))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    fn define_collection(
        &self,
        collection: &str,
        unique: Vec<galaxy::UniqueField>,
    ) -> galaxy_core::Result<()> {
        self.inner.define_collection(collection, unique)
    }
    fn find_all(&self, collection: &str) -> galaxy_core::Result<Vec<Record>> {
        self.check()?;
        self.inner.find_all(collection)
    }
    fn find_by_id(&self, collection: &str, id: &RecordId) -> galaxy_core::Result<Option<Record>> {
        self.check()?;
        self.inner.find_by_id(collection, id)
    }
    fn insert(&self, collection: &str, fields: Map<String, Value>) -> galaxy_core::Result<Record> {
        self.check()?;
        self.inner.insert(collection, fields)
    }
    fn replace_or_insert(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> galaxy_core::Result<(Record, bool)> {
        self.check()?;
        self.inner.replace_or_insert(collection, id, fields)
    }
    fn replace_if_revision(
        &self,
        collection: &str,
        id: &RecordId,
        expected: u64,
        fields: Map<String, Value>,
    ) -> galaxy_core::Result<Record> {
        self.check()?;
        self.inner.replace_if_revision(collection, id, expected, fields)
    }
    fn remove(&self, collection: &str, id: &RecordId) -> galaxy_core::Result<Option<Record>> {
        self.check()?;
        self.inner.remove(collection, id)
    }
    fn count(&self, collection: &str) -> galaxy_core::Result<usize> {
        self.check()?;
        self.inner.count(collection)
    }
}

#[test]
fn store_failures_are_500_for_every_operation() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        down: AtomicBool::new(false),
    });
    let executor = create_executor_on(store.clone());
    let id = create_id(&executor, "cohorts", json!({"name": "Spring"}));
    store.down.store(true, Ordering::SeqCst);

    let responses = [
        list(&executor, "cohorts"),
        get(&executor, "cohorts", &id),
        create(&executor, "cohorts", json!({"name": "Autumn"})),
        upsert(&executor, "cohorts", &id, json!({"name": "Autumn"})),
        patch(
            &executor,
            "cohorts",
            &id,
            json!([{"op": "replace", "path": "/name", "value": "Autumn"}]),
        ),
        destroy(&executor, "cohorts", &id),
    ];
    for response in responses {
        assert_eq!(response.status.as_u16(), 500);
        assert_eq!(response.body_or_null()["error"], "store");
    }
}
