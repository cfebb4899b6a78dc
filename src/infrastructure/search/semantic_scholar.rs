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

const FIELDS: &str = "title,authors,year,abstract,citationCount,url,externalIds,publicationTypes,influentialCitationCount";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    #[serde(default)]
    paper_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    citation_count: Option<u32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    external_ids: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    publication_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    #[serde(default)]
    name: Option<String>,
}

/// Semantic Scholar Graph API 检索源
pub struct SemanticScholarSource {
    client: reqwest::Client,
    base_url: String,
}

impl SemanticScholarSource {
    pub fn new(settings: &SourceSettings, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: settings.base_url.clone(),
        }
    }

    /// 解析 JSON 响应（用于单元测试）
    pub fn parse_response(body: &str) -> Result<Vec<Paper>, SourceError> {
        let response: SearchResponse =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(response.data.into_iter().map(Self::to_paper).collect())
    }

    fn to_paper(raw: S2Paper) -> Paper {
        let external_id = |key: &str| -> Option<String> {
            raw.external_ids
                .as_ref()?
                .get(key)?
                .as_str()
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };
        let doi = external_id("DOI");
        let arxiv_id = external_id("ArXiv");

        Paper {
            source: "Semantic Scholar".to_string(),
            source_id: raw.paper_id.unwrap_or_default(),
            title: raw.title.unwrap_or_else(|| "Untitled".to_string()),
            authors: raw.authors.into_iter().filter_map(|a| a.name).collect(),
            year: raw.year,
            abstract_text: raw.abstract_text.unwrap_or_default(),
            url: raw.url.filter(|u| !u.is_empty()),
            doi,
            arxiv_id,
            venue: None,
            citation_count: raw.citation_count.unwrap_or(0),
            concepts: raw.publication_types.unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("query", query), ("limit", limit.as_str()), ("fields", FIELDS)])
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
        debug!("Semantic Scholar returned {} papers", papers.len());
        Ok(papers)
    }

    fn name(&self) -> &'static str {
        "semantic_scholar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{"total": 2, "data": [
            {"paperId": "abc", "title": "Carbon capture", "authors": [{"name": "Jo Park"}],
             "year": 2020, "abstract": null, "citationCount": 7, "url": "https://s2.org/abc",
             "externalIds": {"DOI": "10.5/cc", "ArXiv": "2001.00001", "CorpusId": 123}},
            {"paperId": "def", "title": "No ids", "authors": [], "externalIds": null}
        ]}"#;

        let papers = SemanticScholarSource::parse_response(body).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].doi.as_deref(), Some("10.5/cc"));
        assert_eq!(papers[0].arxiv_id.as_deref(), Some("2001.00001"));
        assert_eq!(papers[0].abstract_text, "");
        assert_eq!(papers[0].citation_count, 7);
        assert!(papers[1].doi.is_none());
        assert!(papers[1].year.is_none());
    }
}
