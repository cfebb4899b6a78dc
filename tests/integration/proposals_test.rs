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

use super::helpers::{bearer, create_test_app, create_test_app_with_llm};

#[tokio::test]
async fn save_splits_markdown_into_sections() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let saved = app.save_proposal(&token, "Soil Resilience").await;
    assert_eq!(saved["status"], "draft");
    assert_eq!(saved["version"], 1);
    assert_eq!(saved["is_latest"], true);
    assert_eq!(saved["root_id"], saved["id"]);

    let id = saved["id"].as_str().unwrap();
    let detail = app
        .server
        .get(&format!("/v1/proposals/{}", id))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(detail.status_code(), StatusCode::OK);

    let body = detail.json::<Value>();
    assert_eq!(body["access"], "owner");
    let names: Vec<&str> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["section_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Introduction", "Methodology"]);
}

#[tokio::test]
async fn save_requires_title_description_and_content() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/proposals")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "title": "Only a title", "description": "", "content": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_only_returns_own_proposals() {
    let app = create_test_app().await;
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;

    app.save_proposal(&ada, "Ada's proposal").await;
    app.save_proposal(&grace, "Grace's proposal").await;

    let response = app
        .server
        .get("/v1/proposals")
        .add_header("Authorization", bearer(&ada))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let list = response.json::<Vec<Value>>();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Ada's proposal");
}

#[tokio::test]
async fn other_users_cannot_see_a_private_proposal() {
    let app = create_test_app().await;
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let saved = app.save_proposal(&ada, "Private").await;

    let response = app
        .server
        .get(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&grace))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Proposal not found");
}

#[tokio::test]
async fn update_changes_status_and_title() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Draft title").await;

    let response = app
        .server
        .put(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "title": "Final title", "status": "submitted" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["title"], "Final title");
    assert_eq!(body["status"], "submitted");
}

#[tokio::test]
async fn delete_removes_the_proposal() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Short lived").await;
    let path = format!("/v1/proposals/{}", saved["id"].as_str().unwrap());

    let response = app
        .server
        .delete(&path)
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let after = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(after.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_version_becomes_latest_in_the_chain() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Versioned").await;
    let id = saved["id"].as_str().unwrap();

    let created = app
        .server
        .post(&format!("/v1/proposals/{}/versions", id))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let v2 = created.json::<Value>();
    assert_eq!(v2["version"], 2);
    assert_eq!(v2["root_id"], id);

    let versions = app
        .server
        .get(&format!("/v1/proposals/{}/versions", id))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert_eq!(versions.len(), 2);

    let latest: Vec<i64> = versions
        .iter()
        .filter(|v| v["is_latest"] == true)
        .map(|v| v["version"].as_i64().unwrap())
        .collect();
    assert_eq!(latest, vec![2]);
}

#[tokio::test]
async fn section_update_recounts_proposal_words() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Counting").await;

    let detail = app
        .server
        .get(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let sections = detail["sections"].as_array().unwrap();
    let first = sections[0]["id"].as_str().unwrap();
    let other_words = sections[1]["word_count"].as_i64().unwrap();

    let response = app
        .server
        .put(&format!("/v1/sections/{}", first))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "content": "one two three four five" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["section"]["word_count"], 5);
    assert_eq!(body["proposal_word_count"].as_i64().unwrap(), 5 + other_words);
}

#[tokio::test]
async fn ai_edit_without_api_key_is_unavailable() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Editing").await;

    let detail = app
        .server
        .get(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let section = detail["sections"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/v1/sections/{}/ai-edit", section))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "instruction": "Make it more concise" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn ai_edit_returns_rewritten_text() {
    let app = create_test_app_with_llm().await;
    app.mock_llm_reply("Soil communities protect crops during drought [1].")
        .await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Editing").await;

    let detail = app
        .server
        .get(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let section = detail["sections"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/v1/sections/{}/ai-edit", section))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "instruction": "Make it more concise" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["section_id"], section.as_str());
    assert_eq!(
        body["edited_text"],
        "Soil communities protect crops during drought [1]."
    );
}

#[tokio::test]
async fn content_update_replaces_sections_and_export() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Soil Resilience").await;
    let id = saved["id"].as_str().unwrap();
    let path = format!("/v1/proposals/{}", id);

    let before = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let intro_id = before["sections"][0]["id"].clone();

    let comment = app
        .server
        .post(&format!("/v1/proposals/{}/comments", id))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "content": "Expand this.", "section_id": intro_id }))
        .await;
    assert_eq!(comment.status_code(), StatusCode::CREATED);

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "content": "## Introduction\n\nRewritten introduction for the panel.\n\n## Budget\n\nTwo field technicians.\n"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["word_count"], 12);

    let after = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let sections = after["sections"].as_array().unwrap();
    let names: Vec<&str> = sections
        .iter()
        .map(|s| s["section_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Introduction", "Budget"]);
    assert_eq!(sections[0]["id"], intro_id);
    assert_eq!(sections[0]["content"], "Rewritten introduction for the panel.");
    assert_eq!(
        after["proposal"]["content_json"]["sections"][1]["name"],
        "Budget"
    );

    let comments = app
        .server
        .get(&format!("/v1/proposals/{}/comments", id))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert_eq!(comments[0]["section_id"], intro_id);

    let exported = app
        .server
        .get(&format!("/v1/proposals/{}/export/markdown", id))
        .add_header("Authorization", bearer(&token))
        .await
        .text();
    assert!(exported.contains("Rewritten introduction for the panel."));
    assert!(exported.contains("Two field technicians."));
    assert!(!exported.contains("Soil communities buffer crops"));
}

#[tokio::test]
async fn update_rejects_blank_fields() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Kept title").await;
    let path = format!("/v1/proposals/{}", saved["id"].as_str().unwrap());

    for body in [
        json!({ "title": "   " }),
        json!({ "description": "" }),
        json!({ "content": " \n " }),
    ] {
        let response = app
            .server
            .put(&path)
            .add_header("Authorization", bearer(&token))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Title, description, and content are required."
        );
    }

    let detail = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(detail["proposal"]["title"], "Kept title");
    assert_eq!(detail["sections"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_latest_version_restores_previous_one() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Versioned").await;
    let v1 = saved["id"].as_str().unwrap();

    let v2 = app
        .server
        .post(&format!("/v1/proposals/{}/versions", v1))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();

    let deleted = app
        .server
        .delete(&format!("/v1/proposals/{}", v2["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let listed = app
        .server
        .get("/v1/proposals")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], v1);
    assert_eq!(listed[0]["is_latest"], true);
}
