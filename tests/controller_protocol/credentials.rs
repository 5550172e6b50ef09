//! Account credentials

use crate::common::*;
use galaxy::KdfParams;
use galaxy_core::credentials::authenticate;
use serde_json::json;

fn stored_user(executor: &galaxy::Executor) -> galaxy::Record {
    let mut users = snapshot(executor, "users");
    assert_eq!(users.len(), 1);
    users.remove(0)
}

#[test]
fn password_is_never_stored_or_rendered_in_clear() {
    let executor = create_executor();
    let response = create(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ANN@example.com", "password": "hunter2"}),
    );
    assert_eq!(response.status.as_u16(), 201);

    let doc = response.body.unwrap();
    assert!(doc.get("password").is_none());
    assert!(doc.get("salt").is_none());
    assert_eq!(doc["email"], "ann@example.com");
    assert_eq!(doc["role"], "student");
    assert_eq!(doc["profile"], json!({"name": "Ann", "role": "student"}));
    assert_eq!(doc["token"], json!({"_id": doc["_id"], "role": "student"}));

    let user = stored_user(&executor);
    assert_ne!(user.fields["password"], "hunter2");
    assert!(authenticate(&user.fields, "hunter2", &KdfParams::fast()));
    assert!(!authenticate(&user.fields, "hunter3", &KdfParams::fast()));
}

#[test]
fn client_salt_is_ignored() {
    let executor = create_executor();
    create(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw", "salt": "AAAA"}),
    );
    assert_ne!(stored_user(&executor).fields["salt"], "AAAA");
}

#[test]
fn empty_password_is_invalid() {
    let executor = create_executor();
    let response = create(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": ""}),
    );
    assert_eq!(response.status.as_u16(), 400);
    let error = &response.body_or_null()["details"]["errors"][0];
    assert_eq!(error["path"], "password");
    assert_eq!(error["message"], "Invalid password");
}

#[test]
fn oauth_accounts_need_no_password() {
    let executor = create_executor();
    let response = create(
        &executor,
        "users",
        json!({"name": "Ann", "provider": "github", "github": {"login": "ann"}}),
    );
    assert_eq!(response.status.as_u16(), 201, "{:?}", response.body);
    assert!(stored_user(&executor).fields.get("password").is_none());
}

#[test]
fn blank_email_is_invalid() {
    let executor = create_executor();
    let response = create(
        &executor,
        "users",
        json!({"name": "Ann", "email": "", "password": "pw"}),
    );
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(
        response.body_or_null()["details"]["errors"][0]["message"],
        "Email cannot be blank"
    );
}

#[test]
fn duplicate_email_is_rejected() {
    let executor = create_executor();
    create_id(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw"}),
    );
    let response = create(
        &executor,
        "users",
        json!({"name": "Other Ann", "email": "Ann@Example.com", "password": "pw"}),
    );
    assert_eq!(response.status.as_u16(), 400);
    let error = &response.body_or_null()["details"]["errors"][0];
    assert_eq!(error["kind"], "unique");
    assert_eq!(error["message"], "The specified email address is already in use.");
    assert_eq!(snapshot(&executor, "users").len(), 1);
}

#[test]
fn replacing_a_user_keeps_their_own_email() {
    let executor = create_executor();
    let id = create_id(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "pw"}),
    );
    let response = upsert(
        &executor,
        "users",
        &id,
        json!({"name": "Anne", "email": "ann@example.com"}),
    );
    assert_eq!(response.status.as_u16(), 200, "{:?}", response.body);

    // no password in the payload: the stored credentials carry over
    assert!(authenticate(&stored_user(&executor).fields, "pw", &KdfParams::fast()));
}

#[test]
fn patching_the_password_rehashes() {
    let executor = create_executor();
    let id = create_id(
        &executor,
        "users",
        json!({"name": "Ann", "email": "ann@example.com", "password": "old"}),
    );

    patch(
        &executor,
        "users",
        &id,
        json!([{"op": "replace", "path": "/role", "value": "instructor"}]),
    );
    assert!(authenticate(&stored_user(&executor).fields, "old", &KdfParams::fast()));

    let response = patch(
        &executor,
        "users",
        &id,
        json!([{"op": "replace", "path": "/password", "value": "new"}]),
    );
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body_or_null()["role"], "instructor");

    let user = stored_user(&executor);
    assert!(authenticate(&user.fields, "new", &KdfParams::fast()));
    assert!(!authenticate(&user.fields, "old", &KdfParams::fast()));
}

#[tokio::test]
async fn async_hashing_matches_sync() {
    let params = KdfParams::fast();
    let salt = galaxy_core::password::new_salt(params.salt_len);
    let sync = galaxy_core::password::hash("pw", &salt, &params).unwrap();
    let async_digest = galaxy_core::password::hash_async("pw".into(), salt.clone(), params)
        .await
        .unwrap();
    assert_eq!(sync, async_digest);
    assert!(
        galaxy_core::password::verify_async("pw".into(), salt, async_digest, params)
            .await
            .unwrap()
    );
}
