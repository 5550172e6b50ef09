//! CRUD round trips and status codes

use crate::common::*;
use serde_json::json;

#[test]
fn create_then_get_round_trips() {
    let executor = create_executor();
    let created = create(
        &executor,
        "resources",
        json!({"title": "T1", "url": "http://x", "info": "I", "tags": ["rust"]}),
    );
    assert_eq!(created.status.as_u16(), 201);

    let id = created.body_or_null()["_id"].as_str().unwrap().to_string();
    let fetched = get(&executor, "resources", &id);
    assert_eq!(fetched.status.as_u16(), 200);
    assert_eq!(
        without_timestamps(fetched.body.clone().unwrap()),
        without_timestamps(created.body.clone().unwrap())
    );
}

#[test]
fn generated_ids_are_object_id_shaped() {
    let executor = create_executor();
    let id = create_id(&executor, "cohorts", json!({"name": "Spring"}));
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn create_list_destroy_scenario() {
    let executor = create_executor();
    assert_eq!(list(&executor, "resources").body, Some(json!([])));

    let id = create_id(&executor, "resources", json!({"title": "T1", "url": "http://x"}));

    let listed = list(&executor, "resources");
    assert_eq!(listed.status.as_u16(), 200);
    let records = listed.body_or_null().as_array().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["_id"], id.as_str());
    assert_eq!(records[0]["title"], "T1");
    assert_eq!(records[0]["url"], "http://x");
    assert_eq!(records[0]["upvotes"], 0);
    assert_eq!(records[0]["downvotes"], 0);
    assert_eq!(records[0]["tags"], json!([]));

    let deleted = destroy(&executor, "resources", &id);
    assert_eq!(deleted.status.as_u16(), 204);
    assert_eq!(deleted.body, None);

    assert_eq!(list(&executor, "resources").body, Some(json!([])));
}

#[test]
fn absent_ids_are_not_found_and_write_nothing() {
    let executor = create_executor();
    create_id(&executor, "resources", json!({"title": "T1", "url": "http://x"}));
    let before = snapshot(&executor, "resources");

    let responses = [
        get(&executor, "resources", "missing"),
        patch(
            &executor,
            "resources",
            "missing",
            json!([{"op": "replace", "path": "/title", "value": "New"}]),
        ),
        patch(
            &executor,
            "resources",
            "missing",
            json!({"op": "replace", "path": "/title", "value": "New"}),
        ),
        patch(
            &executor,
            "resources",
            "missing",
            json!([{"op": "bogus", "path": "/title"}]),
        ),
        destroy(&executor, "resources", "missing"),
    ];
    for response in responses {
        assert_eq!(response.status.as_u16(), 404);
        assert_eq!(response.body, None);
    }

    assert_eq!(snapshot(&executor, "resources"), before);
}

#[test]
fn second_destroy_is_not_found() {
    let executor = create_executor();
    let id = create_id(&executor, "cohorts", json!({"name": "Spring"}));

    assert_eq!(destroy(&executor, "cohorts", &id).status.as_u16(), 204);
    assert_eq!(destroy(&executor, "cohorts", &id).status.as_u16(), 404);
}

#[test]
fn list_keeps_creation_order() {
    let executor = create_executor();
    for name in ["a", "b", "c"] {
        create_id(&executor, "cohorts", json!({"name": name}));
    }
    let names: Vec<String> = list(&executor, "cohorts")
        .body_or_null()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn timestamps_only_where_enabled() {
    let executor = create_executor();
    let resource = create(&executor, "resources", json!({"title": "T1", "url": "http://x"}));
    assert!(resource.body_or_null().get("createdAt").is_some());
    assert!(resource.body_or_null().get("updatedAt").is_some());

    let cohort = create(&executor, "cohorts", json!({"name": "Spring"}));
    assert!(cohort.body_or_null().get("createdAt").is_none());
}

#[test]
fn unknown_fields_are_discarded() {
    let executor = create_executor();
    let id = create_id(
        &executor,
        "cohorts",
        json!({"name": "Spring", "mascot": "otter"}),
    );
    let fetched = get(&executor, "cohorts", &id);
    assert!(fetched.body_or_null().get("mascot").is_none());
}
