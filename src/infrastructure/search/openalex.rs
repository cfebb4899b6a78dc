// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::config::settings::SourceSettings;
use crate::domain::models::paper::Paper;
use crate::domain::search::source::{PaperSource, SourceError};

const DOI_PREFIX: &str = "https://doi.org/";
const MAX_CONCEPTS: usize = 10;

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authorships: Vec<Authorship>,
    #[serde(default)]
    publication_year: Option<i32>,
    #[serde(default)]
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    cited_by_count: Option<u32>,
    #[serde(default)]
    concepts: Vec<Concept>,
    #[serde(default)]
    primary_location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Authorship {
    #[serde(default)]
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    source: Option<LocationSource>,
}

#[derive(Debug, Deserialize)]
struct LocationSource {
    #[serde(default)]
    display_name: Option<String>,
}

/// OpenAlex works 检索源
pub struct OpenAlexSource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexSource {
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
        }
    }

    /// 解析 JSON 响应（用于单元测试）
    pub fn parse_response(body: &str) -> Result<Vec<Paper>, SourceError> {
        let response: WorksResponse =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(response.results.into_iter().map(Self::to_paper).collect())
    }

    fn to_paper(work: Work) -> Paper {
        let authors = work
            .authorships
            .into_iter()
            .filter_map(|a| a.author.and_then(|author| author.display_name))
            .collect();

        let abstract_text = work
            .abstract_inverted_index
            .as_ref()
            .map(rebuild_abstract)
            .unwrap_or_default();

        let doi = work
            .doi
            .as_deref()
            .map(|d| d.replace(DOI_PREFIX, ""))
            .filter(|d| !d.is_empty());

        let url = work.doi.clone().or_else(|| work.id.clone());

        let concepts = work
            .concepts
            .into_iter()
            .filter_map(|c| c.display_name)
            .take(MAX_CONCEPTS)
            .collect();

        Paper {
            source: "OpenAlex".to_string(),
            source_id: work.id.unwrap_or_default(),
            title: work.title.unwrap_or_else(|| "Untitled".to_string()),
            authors,
            year: work.publication_year,
            abstract_text,
            url,
            doi,
            arxiv_id: None,
            venue: work
                .primary_location
                .and_then(|l| l.source)
                .and_then(|s| s.display_name),
            citation_count: work.cited_by_count.unwrap_or(0),
            concepts,
            ..Default::default()
        }
    }
}

/// 由倒排索引按位置还原摘要
pub fn rebuild_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut positions: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    positions.sort();
    positions
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PaperSource for OpenAlexSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError> {
        let per_page = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search", query),
                ("per_page", per_page.as_str()),
                ("sort", "relevance_score:desc"),
                ("filter", "is_paratext:false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: self.name().to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let papers = Self::parse_response(&body)?;
        debug!("OpenAlex returned {} works", papers.len());
        Ok(papers)
    }

    fn name(&self) -> &'static str {
        "openalex"
    }
}
