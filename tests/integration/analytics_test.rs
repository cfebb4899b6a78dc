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
use serde_json::Value;

use super::helpers::{bearer, create_test_app};

#[tokio::test]
async fn dashboard_lists_catalog_and_recent_proposals() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    app.save_proposal(&token, "First").await;
    app.save_proposal(&token, "Second").await;

    let response = app
        .server
        .get("/v1/dashboard")
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert!(!body["proposal_types"].as_array().unwrap().is_empty());
    assert_eq!(body["total_proposals"], 2);
    assert_eq!(body["recent_proposals"].as_array().unwrap().len(), 2);
    assert_eq!(body["profile"]["total_proposals_saved"], 2);
}

#[tokio::test]
async fn analytics_counts_actions_and_untyped_proposals() {
    let app = create_test_app().await;
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Tracked").await;

    app.server
        .get(&format!("/v1/proposals/{}", saved["id"].as_str().unwrap()))
        .add_header("Authorization", bearer(&token))
        .await;

    let response = app
        .server
        .get("/v1/analytics")
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["total_proposals"], 1);
    assert_eq!(body["proposals_by_type"]["Custom"], 1);
    assert_eq!(body["action_counts"]["save"], 1);
    assert_eq!(body["action_counts"]["view"], 1);
    assert_eq!(body["recent_events"].as_array().unwrap().len(), 2);
}
