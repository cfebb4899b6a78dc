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
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use super::helpers::{bearer, create_test_app};

const CALL_PAGE: &str = r#"<html><body>
<h1>Sustainable Soils Programme 2025</h1>
<p>Applicants must describe the methodology and expected impact of the work.</p>
<p>Eligibility: researchers employed at a UK research organisation.</p>
</body></html>"#;

#[tokio::test]
async fn call_requirements_are_extracted_from_the_page() {
    let app = create_test_app().await;
    Mock::given(method("GET"))
        .and(path("/calls/soils"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CALL_PAGE, "text/html"))
        .mount(&app.source_server)
        .await;
    let token = app.register("ada").await;
    let url = format!("{}/calls/soils", app.source_server.uri());

    let response = app
        .server
        .post("/v1/discover/requirements")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": url }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["url"], url.as_str());
    assert_eq!(body["title"], "Sustainable Soils Programme 2025");
    let eligibility = body["eligibility"].as_array().unwrap();
    assert_eq!(eligibility.len(), 1);
    assert!(eligibility[0].as_str().unwrap().starts_with("Eligibility"));
}

#[tokio::test]
async fn call_requirements_reject_invalid_url() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/discover/requirements")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": "not a url" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "A valid call URL is required"
    );
}

#[tokio::test]
async fn unreachable_call_page_is_a_bad_gateway() {
    let app = create_test_app().await;
    Mock::given(method("GET"))
        .and(path("/calls/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.source_server)
        .await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/discover/requirements")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "url": format!("{}/calls/gone", app.source_server.uri()) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn dynamic_structure_requires_funding_body() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .get("/v1/discover/structure")
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Funding body required");
}
