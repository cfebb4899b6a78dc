// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::helpers::{bearer, create_test_app, registration, PASSWORD};

#[tokio::test]
async fn register_returns_session_and_cookie() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/auth/register")
        .json(&registration("ada"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let cookie = response.header("set-cookie");
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("grantsmith_session="));
    assert!(cookie.contains("HttpOnly"));

    let body = response.json::<Value>();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["profile"]["university"], "Example University");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let app = create_test_app().await;
    app.register("ada").await;

    let mut payload = registration("ada");
    payload["email"] = json!("other@example.org");
    let response = app.server.post("/v1/auth/register").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "Username already exists.");
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let app = create_test_app().await;

    let mut payload = registration("grace");
    payload["confirm_password"] = json!("something else");
    let response = app.server.post("/v1/auth/register").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Passwords do not match.");
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/auth/register")
        .json(&json!({ "username": "grace", "password": PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "All fields are required.");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = create_test_app().await;
    app.register("ada").await;

    let response = app
        .server
        .post("/v1/auth/login")
        .json(&json!({ "username": "ada", "password": "not the password" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Invalid username or password"
    );
}

#[tokio::test]
async fn login_then_cookie_session_reaches_profile() {
    let app = create_test_app().await;
    app.register("ada").await;

    let login = app
        .server
        .post("/v1/auth/login")
        .json(&json!({ "username": "ada", "password": PASSWORD }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
    let token = login.json::<Value>()["token"].as_str().unwrap().to_string();

    let profile = app
        .server
        .get("/v1/profile")
        .add_header("Cookie", format!("grantsmith_session={}", token))
        .await;

    assert_eq!(profile.status_code(), StatusCode::OK);
    let body = profile.json::<Value>();
    assert_eq!(body["first_name"], "Test");
    assert_eq!(body["total_proposals_generated"], 0);
}

#[tokio::test]
async fn update_profile_changes_only_given_fields() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .put("/v1/profile")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "university": "Analytical Engine Institute" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["university"], "Analytical Engine Institute");
    assert_eq!(body["first_name"], "Test");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/auth/logout")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response
        .header("set-cookie")
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let after = app
        .server
        .get("/v1/profile")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(after.status_code(), StatusCode::UNAUTHORIZED);
}
