//! End-to-end tests over the composed router: real handlers, real middleware,
//! in-memory SQLite.

use axum_test::TestServer;
use serde_json::{Value, json};

use placeholder_api::{db, routes::routes::routes, state::AppState};

const JWT_SECRET: &str = "integration-test-secret";

async fn server() -> TestServer {
    let pool = db::connect("sqlite::memory:").await.unwrap();
    db::apply_migrations(&pool).await.unwrap();
    let state = AppState::new(pool, JWT_SECRET.into());
    TestServer::new(routes(state)).unwrap()
}

fn user_body() -> Value {
    json!({
        "name": "A",
        "username": "a",
        "email": "a@x.com",
        "password": "secret1"
    })
}

/// Create the standard test user and return a bearer token for it.
async fn signup_and_login(server: &TestServer) -> (i64, String) {
    let created = server.post("/users").json(&user_body()).await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_i64().unwrap();

    let login = server
        .post("/auth/login")
        .json(&json!({"email": "a@x.com", "password": "secret1"}))
        .await;
    login.assert_status_ok();
    let token = login.json::<Value>()["accessToken"]
        .as_str()
        .unwrap()
        .to_owned();
    (id, token)
}

#[tokio::test]
async fn health_endpoints_respond() {
    let server = server().await;
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn create_user_returns_201_without_password() {
    let server = server().await;

    let response = server.post("/users").json(&user_body()).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body = response.json::<Value>();
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["username"], "a");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn duplicate_user_returns_409() {
    let server = server().await;
    server.post("/users").json(&user_body()).await;

    let mut same_email = user_body();
    same_email["username"] = json!("someone-else");
    let response = server.post("/users").json(&same_email).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_user_body_returns_400() {
    let server = server().await;

    let mut short_password = user_body();
    short_password["password"] = json!("abc");
    let response = server.post("/users").json(&short_password).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_token_and_stripped_user() {
    let server = server().await;
    server.post("/users").json(&user_body()).await;

    let response = server
        .post("/auth/login")
        .json(&json!({"email": "a@x.com", "password": "secret1"}))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["username"], "a");
    assert_eq!(body["user"]["name"], "A");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn bad_credentials_return_401_either_way() {
    let server = server().await;
    server.post("/users").json(&user_body()).await;

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({"email": "a@x.com", "password": "wrong-password"}))
        .await;
    let unknown_email = server
        .post("/auth/login")
        .json(&json!({"email": "ghost@x.com", "password": "secret1"}))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_email.assert_status_unauthorized();
    // Identical bodies: a caller cannot probe which emails exist.
    assert_eq!(
        wrong_password.json::<Value>(),
        unknown_email.json::<Value>()
    );
}

#[tokio::test]
async fn get_missing_user_returns_404() {
    let server = server().await;
    server.get("/users/999").await.assert_status_not_found();
}

#[tokio::test]
async fn patch_user_upserts_nested_address() {
    let server = server().await;
    let (id, _token) = signup_and_login(&server).await;

    let response = server
        .patch(&format!("/users/{}", id))
        .json(&json!({
            "address": {
                "street": "Kulas Light",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": {"lat": "-37.3159", "lng": "81.1496"}
            }
        }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["address"]["city"], "Gwenborough");
    assert_eq!(body["address"]["geo"]["lat"], "-37.3159");
}

#[tokio::test]
async fn delete_user_returns_204_then_404() {
    let server = server().await;
    let (id, _token) = signup_and_login(&server).await;

    server
        .delete(&format!("/users/{}", id))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    server
        .get(&format!("/users/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn get_missing_post_returns_404() {
    let server = server().await;
    server.get("/posts/999").await.assert_status_not_found();
}

#[tokio::test]
async fn post_mutations_require_a_token() {
    let server = server().await;
    let body = json!({"title": "t", "body": "b"});

    server
        .post("/posts")
        .json(&body)
        .await
        .assert_status_unauthorized();
    server
        .patch("/posts/1")
        .json(&body)
        .await
        .assert_status_unauthorized();
    server.delete("/posts/1").await.assert_status_unauthorized();

    // A token signed with a different secret is just as invalid.
    server
        .post("/posts")
        .authorization_bearer("definitely-not-a-jwt")
        .json(&body)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let server = server().await;
    let (id, token) = signup_and_login(&server).await;

    server.delete(&format!("/users/{}", id)).await;

    server
        .post("/posts")
        .authorization_bearer(&token)
        .json(&json!({"title": "t", "body": "b"}))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn post_lifecycle_under_bearer_guard() {
    let server = server().await;
    let (id, token) = signup_and_login(&server).await;

    // Create: owner comes from the token, not the body.
    let created = server
        .post("/posts")
        .authorization_bearer(&token)
        .json(&json!({"title": "sunt aut facere", "body": "quia et suscipit", "userId": 9999}))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let post = created.json::<Value>();
    assert_eq!(post["userId"].as_i64().unwrap(), id);
    assert_eq!(post["user"]["id"].as_i64().unwrap(), id);
    assert!(post["user"].get("password").is_none());
    let post_id = post["id"].as_i64().unwrap();

    // Public reads.
    server.get("/posts").await.assert_status_ok();
    let by_user = server
        .get(&format!("/posts/user/{}", id))
        .await
        .json::<Vec<Value>>();
    assert_eq!(by_user.len(), 1);

    // Guarded update.
    let updated = server
        .patch(&format!("/posts/{}", post_id))
        .authorization_bearer(&token)
        .json(&json!({"title": "new title"}))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["title"], "new title");

    // Guarded delete: 204, then the post is gone.
    server
        .delete(&format!("/posts/{}", post_id))
        .authorization_bearer(&token)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    server
        .get(&format!("/posts/{}", post_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn posts_by_user_with_none_is_empty_list() {
    let server = server().await;
    let response = server.get("/posts/user/123").await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());
}
