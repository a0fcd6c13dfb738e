mod common;

use axum::http::StatusCode;
use common::TestRouter;
use serde_json::{json, Value};

fn test_user() -> Value {
    json!({
        "name": "Test User",
        "email": "test@example.com",
        "age": 25,
        "role": "user"
    })
}

async fn create(app: &TestRouter, body: Value) -> Value {
    let (status, body) = app.post("/api/users", body).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"].clone()
}

#[tokio::test]
async fn create_user_returns_201_with_stored_user() {
    let app = TestRouter::new();

    let (status, body) = app.post("/api/users", test_user()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "test@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["age"], 25);
    assert_eq!(body["data"]["_id"].as_str().unwrap().len(), 24);
    assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = TestRouter::new();
    let created = create(&app, test_user()).await;

    let (status, body) = app
        .get(&format!("/api/users/{}", created["_id"].as_str().unwrap()))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn create_normalizes_email_and_defaults_role() {
    let app = TestRouter::new();

    let created = create(
        &app,
        json!({ "name": "  Jane  ", "email": "  Jane.Doe@Example.COM " }),
    )
    .await;

    assert_eq!(created["name"], "Jane");
    assert_eq!(created["email"], "jane.doe@example.com");
    assert_eq!(created["role"], "user");
    assert!(created.get("age").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let app = TestRouter::new();
    create(&app, test_user()).await;

    let (status, body) = app
        .post(
            "/api/users",
            json!({ "name": "Other", "email": "TEST@example.com" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_400() {
    let app = TestRouter::new();

    let cases = [
        json!({ "name": "A", "email": "a@example.com", "age": -1 }),
        json!({ "name": "A", "email": "a@example.com", "role": "superuser" }),
        json!({ "email": "a@example.com" }),
        json!({ "name": "   ", "email": "a@example.com" }),
        json!({ "name": "A" }),
        json!({ "name": "A", "email": "not-an-email" }),
        json!({ "name": "A", "email": "a@example.com", "isAdmin": true }),
        json!({ "name": "A", "email": "a@example.com", "age": "old" }),
    ];

    for payload in cases {
        let (status, body) = app.post("/api/users", payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
        assert!(body["error"].is_string());
    }

    let (_, body) = app.get("/api/users").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn malformed_json_body_is_a_400_envelope() {
    let app = TestRouter::new();

    let (status, body) = app.post_raw("/api/users", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request");
}

#[tokio::test]
async fn list_users_returns_all_in_insertion_order() {
    let app = TestRouter::new();
    let first = create(&app, json!({ "name": "First", "email": "first@example.com" })).await;
    let second = create(&app, json!({ "name": "Second", "email": "second@example.com" })).await;

    let (status, body) = app.get("/api/users").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"], json!([first, second]));
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = TestRouter::new();
    let created = create(&app, test_user()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = app
        .put(&format!("/api/users/{}", id), json!({ "age": 26 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["age"], 26);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["role"], created["role"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let before = chrono::DateTime::parse_from_rfc3339(created["updatedAt"].as_str().unwrap()).unwrap();
    let after = chrono::DateTime::parse_from_rfc3339(updated["updatedAt"].as_str().unwrap()).unwrap();
    assert!(after > before);
}

#[tokio::test]
async fn update_normalizes_and_validates_fields() {
    let app = TestRouter::new();
    let created = create(&app, test_user()).await;
    let uri = format!("/api/users/{}", created["_id"].as_str().unwrap());

    let (status, body) = app
        .put(&uri, json!({ "email": " New@Example.com ", "role": "moderator" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "new@example.com");
    assert_eq!(body["data"]["role"], "moderator");

    for payload in [
        json!({ "age": -5 }),
        json!({ "name": "" }),
        json!({ "role": "root" }),
        json!({ "_id": "000000000000000000000000" }),
    ] {
        let (status, _) = app.put(&uri, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
    }
}

#[tokio::test]
async fn update_to_taken_email_is_rejected() {
    let app = TestRouter::new();
    create(&app, test_user()).await;
    let other = create(&app, json!({ "name": "Other", "email": "other@example.com" })).await;

    let (status, _) = app
        .put(
            &format!("/api/users/{}", other["_id"].as_str().unwrap()),
            json!({ "email": "test@example.com" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_returns_snapshot_then_404() {
    let app = TestRouter::new();
    let created = create(&app, test_user()).await;
    let uri = format!("/api/users/{}", created["_id"].as_str().unwrap());

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn absent_well_formed_id_is_404_for_every_operation() {
    let app = TestRouter::new();
    let uri = "/api/users/000000000000000000000000";

    let (status, body) = app.get(uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app.put(uri, json!({ "age": 30 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_a_store_error() {
    let app = TestRouter::new();

    let (status, body) = app.get("/api/users/not-an-id").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid user id"));
}

#[tokio::test]
async fn undecodable_id_is_a_store_error_envelope() {
    let app = TestRouter::new();

    for uri in ["/api/users/%FF", "/api/users/%C3%28"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Database error");
        assert!(body["error"].as_str().unwrap().contains("UTF-8"));
    }

    let (status, body) = app.delete("/api/users/%FF").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database error");

    let (status, body) = app
        .put("/api/users/%FF", json!({ "name": "Ada" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database error");
}

#[tokio::test]
async fn store_failures_are_500_and_redacted_in_production() {
    let app = TestRouter::with_environment(service_core::config::Environment::Production);
    app.store.set_connected(false);

    let (status, body) = app.get("/api/users").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database error");
    assert_eq!(body["error"], "Internal server error");
}
