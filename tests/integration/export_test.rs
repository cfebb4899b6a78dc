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

use super::helpers::{bearer, create_test_app, TestApp};

async fn saved_proposal(app: &TestApp) -> (String, String) {
    let token = app.register("ada").await;
    let saved = app.save_proposal(&token, "Soil Resilience").await;
    (token, saved["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn markdown_export_is_an_attachment() {
    let app = create_test_app().await;
    let (token, id) = saved_proposal(&app).await;

    let response = app
        .server
        .get(&format!("/v1/proposals/{}/export/markdown", id))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/markdown; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"Soil_Resilience_Proposal.md\""
    );

    let body = response.text();
    assert!(body.starts_with("# Soil Resilience"));
    assert!(body.contains("Introduction"));
    assert!(body.contains("Methodology"));
}

#[tokio::test]
async fn json_export_carries_the_proposal_record() {
    let app = create_test_app().await;
    let (token, id) = saved_proposal(&app).await;

    let response = app
        .server
        .get(&format!("/v1/proposals/{}/export/json", id))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let record = response.json::<Value>();
    assert_eq!(record["title"], "Soil Resilience");
}

#[tokio::test]
async fn binary_exports_have_their_signatures() {
    let app = create_test_app().await;
    let (token, id) = saved_proposal(&app).await;

    let pdf = app
        .server
        .get(&format!("/v1/proposals/{}/export/pdf", id))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(pdf.status_code(), StatusCode::OK);
    assert_eq!(pdf.header("content-type").to_str().unwrap(), "application/pdf");
    assert!(pdf.as_bytes().starts_with(b"%PDF"));

    let docx = app
        .server
        .get(&format!("/v1/proposals/{}/export/docx", id))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(docx.status_code(), StatusCode::OK);
    // OOXML packages are zip archives
    assert!(docx.as_bytes().starts_with(b"PK"));
}

#[tokio::test]
async fn unsupported_format_is_a_bad_request() {
    let app = create_test_app().await;
    let (token, id) = saved_proposal(&app).await;

    let response = app
        .server
        .get(&format!("/v1/proposals/{}/export/rtf", id))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Unsupported export format");
}

#[tokio::test]
async fn export_of_inaccessible_proposal_is_not_found() {
    let app = create_test_app().await;
    let (_, id) = saved_proposal(&app).await;
    let grace = app.register("grace").await;

    let response = app
        .server
        .get(&format!("/v1/proposals/{}/export/txt", id))
        .add_header("Authorization", bearer(&grace))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_is_counted_as_a_download() {
    let app = create_test_app().await;
    let (token, id) = saved_proposal(&app).await;

    app.server
        .get(&format!("/v1/proposals/{}/export/txt", id))
        .add_header("Authorization", bearer(&token))
        .await;

    let analytics = app
        .server
        .get("/v1/analytics")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(analytics["action_counts"]["download"], 1);
}
