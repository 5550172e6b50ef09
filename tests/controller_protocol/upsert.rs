//! Upsert replacement semantics and identifier handling

use crate::common::*;
use serde_json::json;

#[test]
fn upsert_absent_id_inserts_with_that_id() {
    let executor = create_executor();
    let response = upsert(
        &executor,
        "resources",
        "r1",
        json!({"title": "T1", "url": "http://x"}),
    );
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body_or_null()["_id"], "r1");
    assert_eq!(response.body_or_null()["upvotes"], 0);

    assert_eq!(get(&executor, "resources", "r1").body_or_null()["title"], "T1");
}

#[test]
fn upsert_present_id_replaces_all_fields() {
    let executor = create_executor();
    upsert(
        &executor,
        "resources",
        "r1",
        json!({"title": "T1", "url": "http://x", "info": "I", "upvotes": 7}),
    );

    let response = upsert(
        &executor,
        "resources",
        "r1",
        json!({"title": "T2", "url": "http://y"}),
    );
    assert_eq!(response.status.as_u16(), 200);

    let doc = get(&executor, "resources", "r1").body.unwrap();
    assert_eq!(doc["title"], "T2");
    assert!(doc.get("info").is_none());
    assert_eq!(doc["upvotes"], 0);
    assert_eq!(doc["__v"], 1);
}

#[test]
fn upsert_keeps_creation_time() {
    let executor = create_executor();
    let first = upsert(&executor, "resources", "r1", json!({"title": "T1", "url": "http://x"}));
    let second = upsert(&executor, "resources", "r1", json!({"title": "T2", "url": "http://x"}));
    assert_eq!(
        first.body_or_null()["createdAt"],
        second.body_or_null()["createdAt"]
    );
}

#[test]
fn identifier_in_payload_is_ignored() {
    let executor = create_executor();
    upsert(
        &executor,
        "resources",
        "r1",
        json!({"_id": "other", "id": "other", "title": "x", "url": "http://x"}),
    );

    assert_eq!(get(&executor, "resources", "r1").status.as_u16(), 200);
    assert_eq!(get(&executor, "resources", "other").status.as_u16(), 404);
    let records = snapshot(&executor, "resources");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_str(), "r1");
    assert!(records[0].fields.get("id").is_none());
}

#[test]
fn bookkeeping_in_payload_is_ignored() {
    let executor = create_executor();
    let response = create(
        &executor,
        "resources",
        json!({"title": "x", "url": "http://x", "__v": 40, "createdAt": "1999-01-01T00:00:00Z"}),
    );
    let doc = response.body.unwrap();
    assert_eq!(doc["__v"], 0);
    assert_ne!(doc["createdAt"], "1999-01-01T00:00:00Z");
}

#[test]
fn invalid_upsert_leaves_record_unchanged() {
    let executor = create_executor();
    upsert(&executor, "resources", "r1", json!({"title": "T1", "url": "http://x"}));
    let before = snapshot(&executor, "resources");

    let response = upsert(&executor, "resources", "r1", json!({"title": "T2"}));
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(snapshot(&executor, "resources"), before);
}
