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
use chrono::Utc;
use grantsmith::domain::models::proposal_type::ProposalType;
use grantsmith::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use grantsmith::infrastructure::repositories::proposal_type_repo_impl::ProposalTypeRepositoryImpl;
use serde_json::{json, Value};
use uuid::Uuid;

use super::helpers::{bearer, create_test_app, create_test_app_with_llm, sse_events};

const DESCRIPTION: &str = "We study how soil microbial communities recover after prolonged \
    drought across three agricultural regions and what that means for crop yield.";

const SECTION_TEXT: &str = "Soil microbial communities recover unevenly after drought [1]. \
    Recent field studies report large regional differences [2].";

#[tokio::test]
async fn research_search_returns_ranked_papers() {
    let app = create_test_app().await;
    app.mock_openalex_works(3).await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/research/search")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "query": "soil drought resilience" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let context = response.json::<Value>();
    assert_eq!(context["total_papers"], 3);
    assert_eq!(context["source_counts"]["openalex"], 3);
    assert_eq!(context["papers"][0]["source"], "OpenAlex");
}

#[tokio::test]
async fn research_search_rejects_blank_query() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/research/search")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "query": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quick_generate_requires_detailed_description() {
    let app = create_test_app_with_llm().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "title": "Soil", "keywords": "", "description": "too short" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .starts_with("Please provide a more detailed description"));
}

#[tokio::test]
async fn quick_generate_without_api_key_is_unavailable() {
    let app = create_test_app().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "title": "Soil resilience", "description": DESCRIPTION }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["error"],
        "LLM API key not configured"
    );
}

#[tokio::test]
async fn quick_generate_reports_insufficient_literature() {
    let app = create_test_app_with_llm().await;
    app.mock_openalex_works(2).await;
    app.mock_llm_reply(SECTION_TEXT).await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "title": "Soil resilience", "description": DESCRIPTION }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let events = sse_events(&response.text());
    let last = events.last().expect("at least one event");
    assert_eq!(last["type"], "error");
    assert!(last["content"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient relevant literature found (2 papers)"));
}

#[tokio::test]
async fn quick_generate_streams_sections_and_references() {
    let app = create_test_app_with_llm().await;
    app.mock_openalex_works(6).await;
    app.mock_llm_reply(SECTION_TEXT).await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "title": "Soil resilience",
            "keywords": "soil, drought",
            "description": DESCRIPTION
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = sse_events(&response.text());
    assert_eq!(events.last().unwrap()["type"], "complete");

    let content: String = events
        .iter()
        .filter(|e| e["type"] == "content")
        .filter_map(|e| e["content"].as_str())
        .collect();
    assert!(content.starts_with("GRANT PROPOSAL"));
    assert!(content.contains("Title: Soil resilience"));
    assert!(content.contains(SECTION_TEXT));
    assert!(content.contains("REFERENCES"));
    assert!(content.contains("[1] "));

    // Quick proposals are never stored
    let saved = app
        .server
        .get("/v1/proposals")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert!(saved.is_empty());
}

#[tokio::test]
async fn comprehensive_generate_rejects_unknown_type() {
    let app = create_test_app_with_llm().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/generate/comprehensive")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "proposal_type_id": Uuid::new_v4(),
            "title": "Soil resilience",
            "description": DESCRIPTION
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid proposal type");
}

#[tokio::test]
async fn comprehensive_generate_saves_a_draft() {
    let app = create_test_app_with_llm().await;
    app.mock_openalex_works(6).await;
    app.mock_llm_reply(SECTION_TEXT).await;
    let token = app.register("ada").await;

    let types = app
        .server
        .get("/v1/proposal-types")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    let type_id = types[0]["id"].as_str().unwrap().to_string();

    let detail = app
        .server
        .get(&format!("/v1/proposal-types/{}", type_id))
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    let expected_sections = detail["templates"].as_array().unwrap().len();
    assert!(expected_sections > 0);

    let response = app
        .server
        .post("/v1/generate/comprehensive")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "proposal_type_id": type_id,
            "title": "Soil resilience",
            "keywords": "soil, drought",
            "description": DESCRIPTION,
            "include_news": false
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let events = sse_events(&response.text());
    let phases: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "phase")
        .filter_map(|e| e["phase"].as_str())
        .collect();
    assert_eq!(phases, vec!["rag", "visuals", "generation", "saving"]);

    let rag = events.iter().find(|e| e["type"] == "rag_complete").unwrap();
    assert_eq!(rag["total_papers"], 6);

    let completed = events
        .iter()
        .filter(|e| e["type"] == "section_complete")
        .count();
    assert_eq!(completed, expected_sections);

    let complete = events.last().unwrap();
    assert_eq!(complete["type"], "complete");
    assert_eq!(
        complete["metadata"]["sections"].as_array().unwrap().len(),
        expected_sections
    );
    let proposal_id = complete["proposal_id"].as_str().unwrap();

    let saved = app
        .server
        .get(&format!("/v1/proposals/{}", proposal_id))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(saved.status_code(), StatusCode::OK);
    let saved = saved.json::<Value>();
    assert_eq!(saved["proposal"]["status"], "draft");
    assert_eq!(saved["proposal"]["version"], 1);
    assert_eq!(saved["proposal"]["proposal_type_id"], type_id.as_str());
    assert_eq!(
        saved["sections"].as_array().unwrap().len(),
        expected_sections
    );

    let profile = app
        .server
        .get("/v1/profile")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(profile["total_proposals_generated"], 1);
    assert_eq!(profile["total_proposals_saved"], 1);
}

#[tokio::test]
async fn enhance_rejects_short_content() {
    let app = create_test_app_with_llm().await;
    let token = app.register("ada").await;

    let response = app
        .server
        .post("/v1/enhance")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "proposal_content": "A short draft." }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Proposal too short. Generate a full RAG proposal first."
    );
}

#[tokio::test]
async fn comprehensive_generate_for_type_without_templates_emits_error() {
    let app = create_test_app_with_llm().await;
    app.mock_openalex_works(6).await;
    app.mock_llm_reply(SECTION_TEXT).await;
    let token = app.register("ada").await;

    let now = Utc::now();
    let empty_type = ProposalTypeRepositoryImpl::new(app.db.clone())
        .create_with_templates(
            &ProposalType {
                id: Uuid::new_v4(),
                code: "empty_call".to_string(),
                name: "Empty Call".to_string(),
                description: "A call without section templates".to_string(),
                min_pages: 1,
                max_pages: 5,
                required_sections: vec![],
                optional_sections: vec![],
                template_style: json!({}),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            &[],
        )
        .await
        .expect("Failed to create proposal type");

    let response = app
        .server
        .post("/v1/generate/comprehensive")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "proposal_type_id": empty_type.id,
            "title": "Soil resilience",
            "description": DESCRIPTION
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let events = sse_events(&response.text());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert!(events[0]["message"]
        .as_str()
        .unwrap()
        .contains("Empty Call"));

    let saved = app
        .server
        .get("/v1/proposals")
        .add_header("Authorization", bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert!(saved.is_empty());
}

#[tokio::test]
async fn enhance_streams_sections_and_strips_unknown_citations() {
    let app = create_test_app_with_llm().await;
    app.mock_llm_reply("Drought reshapes soil microbial networks [1] and yields [9].")
        .await;
    let token = app.register("ada").await;

    let rule = "=".repeat(80);
    let draft = format!(
        "Title: Soil Resilience\nKeywords: soil, drought\n\n\
         1. Introduction\n\n{intro}\n\n\
         2. Methodology\n\n{methods}\n\n\
         REFERENCES\n{rule}\n\n\
         [1] Smith, J. (2020). Soil recovery after drought. Soil Biology.\n\
         [2] Lee, K. (2021). Field plots under water stress. Agronomy.\n",
        intro = "Soil microbial communities buffer crops against drought stress [1]. ".repeat(4),
        methods = "We sample forty field plots across three growing seasons [2]. ".repeat(4),
    );
    assert!(draft.chars().count() >= 500);

    let response = app
        .server
        .post("/v1/enhance")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "proposal_content": draft }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let events = sse_events(&response.text());
    assert_eq!(events.last().unwrap()["type"], "complete");

    let warnings: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "warning")
        .filter_map(|e| e["content"].as_str())
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings
        .iter()
        .all(|w| w.starts_with("Warning: Removed invalid citations [9]")));

    let content: String = events
        .iter()
        .filter(|e| e["type"] == "content")
        .filter_map(|e| e["content"].as_str())
        .collect();
    assert!(content.starts_with("ENHANCED GRANT PROPOSAL"));
    assert!(content.contains("Title: Soil Resilience"));
    assert!(content.contains("Drought reshapes soil microbial networks [1]"));
    assert!(!content.contains("[9]"));
    assert!(content.contains("[2] Lee, K. (2021)"));
}
