//! Reference expansion on read

use crate::common::*;
use serde_json::json;

#[test]
fn homework_expands_its_cohort() {
    let executor = create_executor();
    let cohort = create_id(&executor, "cohorts", json!({"name": "Spring"}));
    let homework = create_id(
        &executor,
        "homeworks",
        json!({"title": "Fizzbuzz", "cohort": cohort, "dueDate": "2016-04-01"}),
    );

    let doc = get(&executor, "homeworks", &homework).body.unwrap();
    assert_eq!(doc["cohort"]["_id"], cohort.as_str());
    assert_eq!(doc["cohort"]["name"], "Spring");

    // stored as the bare identifier
    let stored = snapshot(&executor, "homeworks");
    assert_eq!(stored[0].fields["cohort"], json!(cohort));
}

#[test]
fn expanded_reference_can_be_written_back() {
    let executor = create_executor();
    let cohort = create_id(&executor, "cohorts", json!({"name": "Spring"}));
    let squad = create_id(&executor, "squads", json!({"name": "Red", "cohort": cohort}));

    let mut doc = get(&executor, "squads", &squad).body.unwrap();
    doc["name"] = json!("Blue");
    let response = upsert(&executor, "squads", &squad, doc);
    assert_eq!(response.status.as_u16(), 200, "{:?}", response.body);

    let stored = snapshot(&executor, "squads");
    assert_eq!(stored[0].fields["cohort"], json!(cohort));
}

#[test]
fn dangling_references() {
    let executor = create_executor();
    let squad = create_id(&executor, "squads", json!({"name": "Red", "cohort": "gone"}));
    assert_eq!(get(&executor, "squads", &squad).body_or_null()["cohort"], json!(null));

    let user = create_id(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw"}),
    );
    let project = create_id(
        &executor,
        "group-projects",
        json!({"name": "Galaxy", "team": [user, "gone"]}),
    );
    let team = get(&executor, "group-projects", &project).body_or_null()["team"].clone();
    assert_eq!(team.as_array().unwrap().len(), 1);
    assert_eq!(team[0]["name"], "Ann");
    assert!(team[0].get("password").is_none());
}

#[test]
fn expansion_is_one_level_deep() {
    let executor = create_executor();
    let cohort = create_id(&executor, "cohorts", json!({"name": "Spring"}));
    let squad = create_id(&executor, "squads", json!({"name": "Red", "cohort": cohort}));
    let user = create_id(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw", "squad": squad}),
    );

    let doc = get(&executor, "users", &user).body.unwrap();
    assert_eq!(doc["squad"]["name"], "Red");
    assert_eq!(doc["squad"]["cohort"], cohort.as_str());
}
