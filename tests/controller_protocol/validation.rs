//! Schema validation, defaults and normalization

use crate::common::*;
use galaxy::{DocumentLimits, GalaxyConfig};
use serde_json::json;

#[test]
fn missing_required_fields_are_reported_together() {
    let executor = create_executor();
    let response = create(&executor, "resources", json!({"info": "I"}));
    assert_eq!(response.status.as_u16(), 400);

    let body = response.body_or_null();
    assert_eq!(body["error"], "validation");
    let paths: Vec<&str> = body["details"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"title"));
    assert!(paths.contains(&"url"));
    assert_eq!(body["details"]["errors"][0]["message"], "Path `title` is required.");
    assert!(snapshot(&executor, "resources").is_empty());
}

#[test]
fn legacy_mode_reports_validation_as_500() {
    let mut config = GalaxyConfig::default();
    config.errors.legacy_validation_status = true;
    let executor = create_executor_with(config);

    let response = create(&executor, "resources", json!({"info": "I"}));
    assert_eq!(response.status.as_u16(), 500);
    assert_eq!(response.body_or_null()["error"], "validation");
}

#[test]
fn type_and_range_checks() {
    let executor = create_executor();
    let response = create(
        &executor,
        "resources",
        json!({"title": "T", "url": "http://x", "rating": 9, "upvotes": "lots"}),
    );
    assert_eq!(response.status.as_u16(), 400);
    let errors = response.body_or_null()["details"]["errors"].clone();
    let kinds: Vec<&str> = errors
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"max"));
    assert!(kinds.contains(&"type"));
}

#[test]
fn nested_fields_are_validated() {
    let executor = create_executor();
    let response = create(
        &executor,
        "resources",
        json!({"title": "T", "url": "http://x", "github": {"forks_count": "many"}}),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(
        response.body_or_null()["details"]["errors"][0]["path"],
        "github.forks_count"
    );
}

#[test]
fn enum_values_are_enforced() {
    let executor = create_executor();
    let response = create(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw", "role": "wizard"}),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["details"]["errors"][0]["kind"], "enum");
}

#[test]
fn tags_are_lowercased_before_write() {
    let executor = create_executor();
    let id = create_id(
        &executor,
        "resources",
        json!({"title": "T", "url": "http://x", "tags": ["Rust", "WEB"]}),
    );
    let stored = snapshot(&executor, "resources");
    assert_eq!(stored[0].fields["tags"], json!(["rust", "web"]));
    assert_eq!(get(&executor, "resources", &id).body_or_null()["tags"], json!(["rust", "web"]));
}

#[test]
fn dates_must_parse() {
    let executor = create_executor();
    let ok = create(
        &executor,
        "cohorts",
        json!({"name": "Spring", "startDate": "2016-03-01", "endDate": "2016-06-01T00:00:00Z"}),
    );
    assert_eq!(ok.status.as_u16(), 201);

    let bad = create(&executor, "cohorts", json!({"name": "Spring", "startDate": "soon"}));
    assert_eq!(bad.status.as_u16(), 400);
}

#[test]
fn document_limits_are_enforced() {
    let mut config = GalaxyConfig::default();
    config.limits = DocumentLimits::with_small_limits();
    let executor = create_executor_with(config);

    let tags: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
    let response = create(
        &executor,
        "resources",
        json!({"title": "T", "url": "http://x", "tags": tags}),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["error"], "limit_exceeded");
}

#[test]
fn non_object_payload_is_invalid_input() {
    let executor = create_executor();
    let response = create(&executor, "resources", json!(["title"]));
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.body_or_null()["error"], "invalid_input");
}
