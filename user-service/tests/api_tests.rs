mod common;

use std::collections::BTreeSet;

use auth::Role;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "name": "Alice Smith",
            "email": "alice@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["name"], "Alice Smith");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "USER");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("Alice", "dup@example.com", "pw_one!", &[])
        .await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "name": "Bob",
            "email": "dup@example.com",
            "password": "pw_two!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_duplicate_email_different_case() {
    let app = TestApp::spawn().await;

    app.register("Alice", "case@example.com", "pw_one!", &[])
        .await;

    // Email uniqueness is case-normalized
    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "name": "Bob",
            "email": "Case@Example.COM",
            "password": "pw_two!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "name": "Alice",
            "email": "not-an-email",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_unknown_role_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "pass_word!",
            "roles": ["SUPERUSER"]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_with_admin_role() {
    let app = TestApp::spawn().await;

    let body = app
        .register("Root", "root@example.com", "pass_word!", &["ADMIN"])
        .await;

    assert_eq!(body["data"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    app.register("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    app.register("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let unknown_email = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "missing@example.com",
            "password": "whatever"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Same status and same body: no account enumeration via error detail
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password_body: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email_body: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(
        wrong_password_body["data"]["message"],
        unknown_email_body["data"]["message"]
    );
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get("/api/users")
        .bearer_auth("garbage-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::spawn().await;

    app.register("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    // Mint a token whose 24h window elapsed long ago
    let expired = app
        .authenticator
        .issue_token(
            "alice@example.com",
            &BTreeSet::from([Role::User]),
            Utc::now() - Duration::hours(48),
        )
        .unwrap();

    let response = app
        .get("/api/users")
        .bearer_auth(expired)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = TestApp::spawn().await;

    let token = app
        .register_for_token("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    let signature_start = token.rfind('.').unwrap() + 1;
    let mut bytes = token.into_bytes();
    bytes[signature_start] = if bytes[signature_start] == b'A' {
        b'B'
    } else {
        b'A'
    };
    let tampered = String::from_utf8(bytes).unwrap();

    let response = app
        .get("/api/users")
        .bearer_auth(tampered)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_token_round_trip() {
    let app = TestApp::spawn().await;

    let token = app
        .register_for_token("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    // The minted token carries the registration identity and roles
    let claims = app
        .authenticator
        .validate_token(&token, Utc::now())
        .expect("Token validation failed");
    assert_eq!(claims.sub, "alice@example.com");
    assert_eq!(claims.roles, BTreeSet::from([Role::User]));

    // And grants access to protected reads
    let response = app
        .get("/api/users")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_role_cannot_administer() {
    let app = TestApp::spawn().await;

    let token = app
        .register_for_token("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    let response = app
        .post("/api/users")
        .bearer_auth(&token)
        .json(&json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Reads stay allowed for plain users
    let response = app
        .get("/api/users")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_crud_flow() {
    let app = TestApp::spawn().await;

    let admin_token = app
        .register_for_token("Root", "root@example.com", "pass_word!", &["ADMIN"])
        .await;

    // Create
    let response = app
        .post("/api/users")
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "pass_word!",
            "roles": ["USER"]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let user_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["roles"], json!(["USER"]));
    assert_eq!(body["data"]["active"], true);

    // Read
    let response = app
        .get(&format!("/api/users/{}", user_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "bob@example.com");

    // Update
    let response = app
        .put(&format!("/api/users/{}", user_id))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Robert",
            "active": false
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["name"], "Robert");
    assert_eq!(body["data"]["active"], false);

    // Delete
    let response = app
        .delete(&format!("/api/users/{}", user_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let response = app
        .get(&format!("/api/users/{}", user_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_password_update_changes_login() {
    let app = TestApp::spawn().await;

    let admin_token = app
        .register_for_token("Root", "root@example.com", "pass_word!", &["ADMIN"])
        .await;

    let response = app
        .post("/api/users")
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "old_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .put(&format!("/api/users/{}", user_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "password": "new_password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let old_login = app
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "old_password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login = app
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "new_password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(new_login.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deactivated_user_cannot_login() {
    let app = TestApp::spawn().await;

    let admin_token = app
        .register_for_token("Root", "root@example.com", "pass_word!", &["ADMIN"])
        .await;

    let response = app
        .post("/api/users")
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "pass_word!",
            "active": false
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "pass_word!" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_user_rejects_malformed_id() {
    let app = TestApp::spawn().await;

    let token = app
        .register_for_token("Alice", "alice@example.com", "pass_word!", &[])
        .await;

    let response = app
        .get("/api/users/not-a-uuid")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
