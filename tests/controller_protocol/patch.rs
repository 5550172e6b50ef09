//! JSON Patch application, atomicity and revision checks

use crate::common::*;
use proptest::prelude::*;
use serde_json::{json, Value};

fn seeded() -> (galaxy::Executor, String) {
    let executor = create_executor();
    let id = create_id(
        &executor,
        "resources",
        json!({"title": "Old", "info": "I", "url": "http://x", "tags": ["a", "b"]}),
    );
    (executor, id)
}

#[test]
fn replace_title() {
    let (executor, id) = seeded();
    let response = patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "replace", "path": "/title", "value": "New"}]),
    );
    assert_eq!(response.status.as_u16(), 200);

    let doc = get(&executor, "resources", &id).body.unwrap();
    assert_eq!(doc["_id"], id.as_str());
    assert_eq!(doc["title"], "New");
    assert_eq!(doc["info"], "I");
}

#[test]
fn missing_path_fails_and_changes_nothing() {
    let (executor, id) = seeded();
    let before = snapshot(&executor, "resources");

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "replace", "path": "/nonexistent", "value": 1}]),
    );
    assert_eq!(response.status.as_u16(), 400);
    let body = response.body_or_null();
    assert_eq!(body["error"], "patch");
    assert_eq!(body["details"]["kind"], "operation");
    assert_eq!(body["details"]["index"], 0);
    assert_eq!(body["details"]["fault"]["fault"], "path_not_found");

    assert_eq!(snapshot(&executor, "resources"), before);
}

#[test]
fn operations_see_earlier_effects() {
    let (executor, id) = seeded();
    let response = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "add", "path": "/tags/-", "value": "c"},
            {"op": "move", "from": "/tags/0", "path": "/tags/-"},
            {"op": "copy", "from": "/title", "path": "/info"},
            {"op": "test", "path": "/tags", "value": ["b", "c", "a"]}
        ]),
    );
    assert_eq!(response.status.as_u16(), 200, "{:?}", response.body);
    let doc = response.body.unwrap();
    assert_eq!(doc["tags"], json!(["b", "c", "a"]));
    assert_eq!(doc["info"], "Old");
}

#[test]
fn failed_test_rolls_back_earlier_operations() {
    let (executor, id) = seeded();
    let before = snapshot(&executor, "resources");

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "replace", "path": "/title", "value": "New"},
            {"op": "test", "path": "/info", "value": "something else"}
        ]),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["details"]["index"], 1);
    assert_eq!(snapshot(&executor, "resources"), before);
}

#[test]
fn identifier_operations_are_dropped() {
    let (executor, id) = seeded();
    let response = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "replace", "path": "/_id", "value": "other"},
            {"op": "remove", "path": "/_id"},
            {"op": "replace", "path": "/title", "value": "New"}
        ]),
    );
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body_or_null()["_id"], id.as_str());
    assert_eq!(get(&executor, "resources", "other").status.as_u16(), 404);
}

#[test]
fn identifier_guards_still_apply() {
    let (executor, id) = seeded();
    let before = snapshot(&executor, "resources");

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "test", "path": "/_id", "value": "someone-else"},
            {"op": "replace", "path": "/title", "value": "New"}
        ]),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["error"], "patch");
    assert_eq!(snapshot(&executor, "resources"), before);

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "test", "path": "/_id", "value": id},
            {"op": "copy", "from": "/_id", "path": "/info"}
        ]),
    );
    assert_eq!(response.status.as_u16(), 200);
    let doc = get(&executor, "resources", &id).body.unwrap();
    assert_eq!(doc["_id"], id.as_str());
    assert_eq!(doc["info"], id.as_str());
}

#[test]
fn patched_record_is_normalized_and_validated() {
    let (executor, id) = seeded();

    let response = patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "add", "path": "/tags/0", "value": "WEB"}]),
    );
    assert_eq!(response.body_or_null()["tags"], json!(["web", "a", "b"]));

    let before = snapshot(&executor, "resources");
    let response = patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "replace", "path": "/upvotes", "value": "many"}]),
    );
    assert_eq!(response.status.as_u16(), 400);
    let details = &response.body_or_null()["details"];
    assert_eq!(details["kind"], "schema");
    assert_eq!(details["errors"][0]["path"], "upvotes");
    assert_eq!(snapshot(&executor, "resources"), before);
}

#[test]
fn revision_test_guards_against_stale_writes() {
    let (executor, id) = seeded();
    patch(
        &executor,
        "resources",
        &id,
        json!([{"op": "replace", "path": "/title", "value": "First"}]),
    );

    let stale = patch(
        &executor,
        "resources",
        &id,
        json!([
            {"op": "test", "path": "/__v", "value": 0},
            {"op": "replace", "path": "/title", "value": "Second"}
        ]),
    );
    assert_eq!(stale.status.as_u16(), 400);
    assert_eq!(get(&executor, "resources", &id).body_or_null()["title"], "First");
}

#[test]
fn malformed_bodies_are_rejected() {
    let (executor, id) = seeded();
    for body in [
        json!({"op": "replace", "path": "/title", "value": "x"}),
        json!([{"op": "rename", "path": "/title"}]),
        json!([{"op": "replace", "path": "title", "value": "x"}]),
        json!([{"op": "add", "path": "/title"}]),
    ] {
        let response = patch(&executor, "resources", &id, body.clone());
        assert_eq!(response.status.as_u16(), 400, "accepted {body}");
        assert_eq!(response.body_or_null()["error"], "patch");
    }
}

fn valid_op() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|t| json!({"op": "replace", "path": "/title", "value": t})),
        "[a-z]{1,8}".prop_map(|t| json!({"op": "add", "path": "/tags/-", "value": t})),
        (0u32..50).prop_map(|n| json!({"op": "replace", "path": "/upvotes", "value": n})),
        Just(json!({"op": "copy", "from": "/title", "path": "/info"})),
    ]
}

fn failing_op() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"op": "remove", "path": "/missing"})),
        Just(json!({"op": "replace", "path": "/tags/99", "value": "x"})),
        Just(json!({"op": "test", "path": "/title", "value": 42})),
        Just(json!({"op": "replace", "path": "/rating", "value": 6})),
        Just(json!({"op": "add", "path": "/rating", "value": -1})),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn failing_patch_never_writes(
        prefix in prop::collection::vec(valid_op(), 0..6),
        fail in failing_op(),
    ) {
        let (executor, id) = seeded();
        let before = snapshot(&executor, "resources");

        let mut ops = prefix;
        ops.push(fail);
        let response = patch(&executor, "resources", &id, Value::Array(ops));

        prop_assert_eq!(response.status.as_u16(), 400);
        prop_assert_eq!(snapshot(&executor, "resources"), before);
    }
}
