// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::settings::SourceSettings;
use crate::domain::models::paper::Paper;
use crate::domain::search::source::{PaperSource, SourceError};
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::text_processing::{normalize_whitespace, strip_html_tags};

const MIN_ABSTRACT_CHARS: usize = 100;
const MAX_AUTHORS: usize = 5;

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    #[serde(default)]
    message: Option<CrossrefMessage>,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    items: Vec<CrossrefItem>,
}

#[derive(Debug, Deserialize)]
struct CrossrefItem {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
    #[serde(default)]
    published: Option<CrossrefDate>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

/// Crossref works 检索源
///
/// 只保留带标题且摘要足够长的期刊论文，超时按策略重试
pub struct CrossrefSource {
    client: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl CrossrefSource {
    pub fn new(settings: &SourceSettings, timeout: Duration, contact_email: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "GrantProposalGenerator/1.0 (mailto:{contact_email})"
            ))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: settings.base_url.clone(),
            retry_policy: RetryPolicy::for_timeouts(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 解析 JSON 响应（用于单元测试）
    pub fn parse_response(body: &str) -> Result<Vec<Paper>, SourceError> {
        let response: CrossrefResponse =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(response
            .message
            .map(|m| m.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Self::to_paper)
            .collect())
    }

    fn to_paper(item: CrossrefItem) -> Option<Paper> {
        let title = item.title.into_iter().next().filter(|t| !t.trim().is_empty())?;
        let abstract_text = item
            .abstract_text
            .map(|a| normalize_whitespace(&strip_html_tags(&a)))
            .filter(|a| a.chars().count() >= MIN_ABSTRACT_CHARS)?;

        let authors = item
            .author
            .into_iter()
            .take(MAX_AUTHORS)
            .map(|a| {
                format!(
                    "{} {}",
                    a.given.unwrap_or_default(),
                    a.family.unwrap_or_default()
                )
                .trim()
                .to_string()
            })
            .filter(|name| !name.is_empty())
            .collect();

        let year = item
            .published
            .and_then(|d| d.date_parts.into_iter().next())
            .and_then(|parts| parts.into_iter().next().flatten());

        let doi = item.doi.filter(|d| !d.is_empty());

        Some(Paper {
            source: "Crossref".to_string(),
            source_id: doi.clone().unwrap_or_default(),
            title,
            authors,
            year,
            abstract_text,
            url: doi.as_ref().map(|d| format!("https://doi.org/{d}")),
            doi,
            venue: item.container_title.into_iter().next(),
            ..Default::default()
        })
    }

    async fn fetch(&self, query: &str, limit: u32) -> Result<String, SourceError> {
        let rows = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query),
                ("rows", rows.as_str()),
                ("filter", "type:journal-article"),
                ("select", "DOI,title,author,abstract,published,container-title"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: "crossref".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PaperSource for CrossrefSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError> {
        let body = self
            .retry_policy
            .run(
                || self.fetch(query, limit),
                |e| matches!(e, SourceError::Timeout),
            )
            .await?;

        let papers = Self::parse_response(&body)?;
        debug!("Crossref returned {} usable articles", papers.len());
        Ok(papers)
    }

    fn name(&self) -> &'static str {
        "crossref"
    }
}
