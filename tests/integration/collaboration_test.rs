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

use super::helpers::{bearer, create_test_app, TestApp};

/// ada 创建提案并把 grace 以 `role` 加为协作者，返回 (ada, grace, 提案 id)
async fn shared_proposal(app: &TestApp, role: &str) -> (String, String, String) {
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let saved = app.save_proposal(&ada, "Shared work").await;
    let id = saved["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/v1/proposals/{}/collaborators", id))
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "username": "grace", "role": role }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let collaborator = response.json::<Value>();
    assert_eq!(collaborator["username"], "grace");
    assert_eq!(collaborator["role"], role);

    (ada, grace, id)
}

#[tokio::test]
async fn collaborator_sees_shared_proposal() {
    let app = create_test_app().await;
    let (_, grace, id) = shared_proposal(&app, "viewer").await;

    let shared = app
        .server
        .get("/v1/proposals/shared")
        .add_header("Authorization", bearer(&grace))
        .await;
    assert_eq!(shared.status_code(), StatusCode::OK);
    let list = shared.json::<Vec<Value>>();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id.as_str());

    let detail = app
        .server
        .get(&format!("/v1/proposals/{}", id))
        .add_header("Authorization", bearer(&grace))
        .await;
    assert_eq!(detail.status_code(), StatusCode::OK);
    assert_eq!(detail.json::<Value>()["access"], "viewer");
}

#[tokio::test]
async fn viewer_cannot_edit_but_editor_can() {
    let app = create_test_app().await;
    let (ada, grace, id) = shared_proposal(&app, "viewer").await;
    let path = format!("/v1/proposals/{}", id);

    let denied = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(&grace))
        .json(&json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

    let grace_id = app
        .server
        .get("/v1/profile")
        .add_header("Authorization", bearer(&grace))
        .await
        .json::<Value>()["user_id"]
        .as_str()
        .unwrap()
        .to_string();
    let removed = app
        .server
        .delete(&format!("/v1/proposals/{}/collaborators/{}", id, grace_id))
        .add_header("Authorization", bearer(&ada))
        .await;
    assert_eq!(removed.status_code(), StatusCode::NO_CONTENT);

    let readded = app
        .server
        .post(&format!("/v1/proposals/{}/collaborators", id))
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "username": "grace", "role": "editor" }))
        .await;
    assert_eq!(readded.status_code(), StatusCode::CREATED);

    let allowed = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(&grace))
        .json(&json!({ "title": "Edited together" }))
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    assert_eq!(allowed.json::<Value>()["title"], "Edited together");
}

#[tokio::test]
async fn only_owner_manages_collaborators() {
    let app = create_test_app().await;
    let (_, grace, id) = shared_proposal(&app, "editor").await;
    app.register("alan").await;

    let response = app
        .server
        .post(&format!("/v1/proposals/{}/collaborators", id))
        .add_header("Authorization", bearer(&grace))
        .json(&json!({ "username": "alan", "role": "viewer" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn adding_a_collaborator_twice_conflicts() {
    let app = create_test_app().await;
    let (ada, _, id) = shared_proposal(&app, "viewer").await;

    let response = app
        .server
        .post(&format!("/v1/proposals/{}/collaborators", id))
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "username": "grace", "role": "viewer" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn owner_cannot_add_themselves_or_unknown_users() {
    let app = create_test_app().await;
    let ada = app.register("ada").await;
    let saved = app.save_proposal(&ada, "Solo").await;
    let path = format!(
        "/v1/proposals/{}/collaborators",
        saved["id"].as_str().unwrap()
    );

    let myself = app
        .server
        .post(&path)
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "username": "ada", "role": "editor" }))
        .await;
    assert_eq!(myself.status_code(), StatusCode::BAD_REQUEST);

    let nobody = app
        .server
        .post(&path)
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "username": "nobody", "role": "editor" }))
        .await;
    assert_eq!(nobody.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_lifecycle() {
    let app = create_test_app().await;
    let (ada, grace, id) = shared_proposal(&app, "viewer").await;

    let created = app
        .server
        .post(&format!("/v1/proposals/{}/comments", id))
        .add_header("Authorization", bearer(&grace))
        .json(&json!({ "content": "Cite the 2021 field trial here." }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let comment = created.json::<Value>();
    assert_eq!(comment["username"], "grace");
    assert_eq!(comment["resolved"], false);
    let comment_id = comment["id"].as_str().unwrap().to_string();

    // Empty body resolves
    let resolved = app
        .server
        .put(&format!("/v1/comments/{}/resolve", comment_id))
        .add_header("Authorization", bearer(&ada))
        .await;
    assert_eq!(resolved.status_code(), StatusCode::OK);
    assert_eq!(resolved.json::<Value>()["resolved"], true);

    let reopened = app
        .server
        .put(&format!("/v1/comments/{}/resolve", comment_id))
        .add_header("Authorization", bearer(&grace))
        .json(&json!({ "resolved": false }))
        .await;
    assert_eq!(reopened.status_code(), StatusCode::OK);
    assert_eq!(reopened.json::<Value>()["resolved"], false);

    let listed = app
        .server
        .get(&format!("/v1/proposals/{}/comments", id))
        .add_header("Authorization", bearer(&ada))
        .await
        .json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);

    let deleted = app
        .server
        .delete(&format!("/v1/comments/{}", comment_id))
        .add_header("Authorization", bearer(&ada))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = create_test_app().await;
    let ada = app.register("ada").await;
    let saved = app.save_proposal(&ada, "Quiet").await;

    let response = app
        .server
        .post(&format!(
            "/v1/proposals/{}/comments",
            saved["id"].as_str().unwrap()
        ))
        .add_header("Authorization", bearer(&ada))
        .json(&json!({ "content": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Comment content is required"
    );
}
