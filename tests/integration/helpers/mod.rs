// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use grantsmith::config::settings::Settings;
use grantsmith::domain::services::llm_service::{LlmClient, OpenAiClient};
use grantsmith::infrastructure::catalog::seed_catalog;
use grantsmith::infrastructure::database::connection;
use grantsmith::infrastructure::discovery::FundingDiscovery;
use grantsmith::infrastructure::repositories::proposal_type_repo_impl::ProposalTypeRepositoryImpl;
use grantsmith::infrastructure::search::build_aggregator;
use grantsmith::presentation::routes::{self, AppComponents};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PASSWORD: &str = "correct horse battery";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub settings: Arc<Settings>,
    // Keep mock servers alive for the duration of the test
    pub llm_server: MockServer,
    pub source_server: MockServer,
}

/// 未配置大模型密钥的测试应用
pub async fn create_test_app() -> TestApp {
    create_test_app_with_options(false).await
}

/// 大模型与 OpenAlex 均指向本地 mock 服务的测试应用
pub async fn create_test_app_with_llm() -> TestApp {
    create_test_app_with_options(true).await
}

async fn create_test_app_with_options(with_llm_key: bool) -> TestApp {
    let llm_server = MockServer::start().await;
    let source_server = MockServer::start().await;

    let llm_url = llm_server.uri();
    let openalex_url = format!("{}/works", source_server.uri());

    let mut overrides: Vec<(&str, &str)> = vec![
        ("database.url", "sqlite::memory:"),
        ("llm.api_base_url", llm_url.as_str()),
        ("sources.arxiv.enabled", "false"),
        ("sources.semantic_scholar.enabled", "false"),
        ("sources.crossref.enabled", "false"),
        ("sources.openalex.base_url", openalex_url.as_str()),
        ("sources.openalex.min_interval_ms", "0"),
        ("sources.cache_ttl_secs", "0"),
        ("web.enabled", "false"),
        ("metrics.enabled", "false"),
    ];
    if with_llm_key {
        overrides.push(("llm.api_key", "sk-test"));
    }

    let settings = Arc::new(Settings::with_overrides(&overrides).expect("Failed to build settings"));

    let db = Arc::new(
        connection::connect_and_migrate(&settings.database)
            .await
            .expect("Failed to connect to in-memory database"),
    );
    seed_catalog(&ProposalTypeRepositoryImpl::new(db.clone()))
        .await
        .expect("Failed to seed catalog");

    let llm: Arc<dyn LlmClient> = Arc::new(
        OpenAiClient::new(&settings.llm).expect("Failed to build LLM client"),
    );
    let app = routes::routes(AppComponents {
        settings: settings.clone(),
        db: db.clone(),
        aggregator: Arc::new(build_aggregator(&settings)),
        llm,
        discovery: Arc::new(FundingDiscovery::new(&settings.web)),
    });

    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        db,
        settings,
        llm_server,
        source_server,
    }
}

impl TestApp {
    /// 注册用户并返回会话令牌
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .server
            .post("/v1/auth/register")
            .json(&registration(username))
            .await;
        assert_eq!(
            response.status_code(),
            axum::http::StatusCode::CREATED,
            "registration failed: {}",
            response.text()
        );
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in registration response")
            .to_string()
    }

    /// 以令牌身份保存一份提案，返回提案 JSON
    pub async fn save_proposal(&self, token: &str, title: &str) -> Value {
        let response = self
            .server
            .post("/v1/proposals")
            .add_header("Authorization", format!("Bearer {}", token))
            .json(&json!({
                "title": title,
                "keywords": "soil microbiome, drought",
                "description": "Drought resilience of agricultural soil communities.",
                "content": sample_content(),
            }))
            .await;
        assert_eq!(
            response.status_code(),
            axum::http::StatusCode::CREATED,
            "save failed: {}",
            response.text()
        );
        response.json::<Value>()
    }

    /// 所有大模型请求返回同一段文本
    pub async fn mock_llm_reply(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
            })))
            .mount(&self.llm_server)
            .await;
    }

    /// OpenAlex 返回 `count` 篇论文
    pub async fn mock_openalex_works(&self, count: usize) {
        let results: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("https://openalex.org/W{}", 1000 + i),
                    "title": format!("Soil microbial resilience under drought, study {}", i + 1),
                    "authorships": [
                        { "author": { "display_name": format!("Author {}", i + 1) } }
                    ],
                    "publication_year": 2018 + (i % 6) as i32,
                    "abstract_inverted_index": {
                        "We": [0], "measure": [1], "drought": [2], "resilience": [3]
                    },
                    "doi": format!("https://doi.org/10.1000/soil.{}", i + 1),
                    "cited_by_count": 10 * (i + 1),
                    "concepts": [{ "display_name": "Soil science" }],
                    "primary_location": { "source": { "display_name": "Soil Biology" } }
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/works"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
            .mount(&self.source_server)
            .await;
    }
}

pub fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.org", username),
        "first_name": "Test",
        "last_name": "User",
        "university": "Example University",
        "password": PASSWORD,
        "confirm_password": PASSWORD,
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn sample_content() -> &'static str {
    "## Introduction\n\nSoil communities buffer crops against drought [1].\n\n\
     ## Methodology\n\nWe sample forty field plots across three seasons [2].\n"
}

/// 解析 SSE 响应体中的 `data:` 行
pub fn sse_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .filter_map(|data| serde_json::from_str(data.trim()).ok())
        .collect()
}
