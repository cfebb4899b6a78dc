// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use roxmltree::{Document, Node};
use std::time::Duration;
use tracing::debug;

use crate::config::settings::SourceSettings;
use crate::domain::models::paper::Paper;
use crate::domain::search::source::{PaperSource, SourceError};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const ARXIV_NS: &str = "http://arxiv.org/schemas/atom";

/// arXiv Atom API 检索源
pub struct ArxivSource {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivSource {
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

    /// 解析 Atom 响应（用于单元测试）
    pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
        let doc = Document::parse(xml).map_err(|e| SourceError::Parse(e.to_string()))?;

        let papers = doc
            .root_element()
            .children()
            .filter(|n| is_elem(n, ATOM_NS, "entry"))
            .filter_map(|entry| Self::parse_entry(&entry))
            .collect();

        Ok(papers)
    }

    fn parse_entry(entry: &Node) -> Option<Paper> {
        let title = single_line(&child_text(entry, ATOM_NS, "title")?);
        let summary = single_line(&child_text(entry, ATOM_NS, "summary").unwrap_or_default());

        let authors = entry
            .children()
            .filter(|n| is_elem(n, ATOM_NS, "author"))
            .filter_map(|author| child_text(&author, ATOM_NS, "name"))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let year = child_text(entry, ATOM_NS, "published")
            .and_then(|published| published.trim().split('-').next()?.parse::<i32>().ok());

        let id_url = child_text(entry, ATOM_NS, "id")?.trim().to_string();
        let arxiv_id = id_url
            .rsplit("/abs/")
            .next()
            .unwrap_or(id_url.as_str())
            .to_string();

        let categories = entry
            .children()
            .filter(|n| is_elem(n, ATOM_NS, "category"))
            .filter_map(|n| n.attribute("term"))
            .map(str::to_string)
            .collect();

        let doi = child_text(entry, ARXIV_NS, "doi")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Some(Paper {
            source: "arXiv".to_string(),
            source_id: arxiv_id.clone(),
            title,
            authors,
            year,
            abstract_text: summary,
            url: Some(id_url),
            doi,
            arxiv_id: Some(arxiv_id),
            concepts: categories,
            ..Default::default()
        })
    }
}

fn is_elem(node: &Node, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(namespace)
}

fn child_text(node: &Node, namespace: &str, name: &str) -> Option<String> {
    node.children()
        .find(|n| is_elem(n, namespace, name))
        .and_then(|n| n.text())
        .map(str::to_string)
}

fn single_line(text: &str) -> String {
    text.trim().replace('\n', " ")
}

#[async_trait]
impl PaperSource for ArxivSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError> {
        let search_query = format!("all:{query}");
        let max_results = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
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
        let papers = Self::parse_feed(&body)?;
        debug!("arXiv returned {} entries", papers.len());
        Ok(papers)
    }

    fn name(&self) -> &'static str {
        "arxiv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title>ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2401.01234v1</id>
    <published>2024-01-03T18:00:00Z</published>
    <title>Graph Neural Networks
 for Soil Carbon</title>
    <summary>  We model soil
carbon with graphs.  </summary>
    <author><name>Ana Silva</name></author>
    <author><name>Li Wei</name></author>
    <arxiv:doi>10.1000/soil.1</arxiv:doi>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
    <category term="q-bio.QM" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2301.00001v2</id>
    <published>2023-01-01T00:00:00Z</published>
    <title>Second</title>
    <summary>Short.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = ArxivSource::parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.title, "Graph Neural Networks  for Soil Carbon");
        assert_eq!(first.abstract_text, "We model soil carbon with graphs.");
        assert_eq!(first.authors, vec!["Ana Silva", "Li Wei"]);
        assert_eq!(first.year, Some(2024));
        assert_eq!(first.arxiv_id.as_deref(), Some("2401.01234v1"));
        assert_eq!(first.doi.as_deref(), Some("10.1000/soil.1"));
        assert_eq!(first.concepts, vec!["cs.LG", "q-bio.QM"]);
        assert_eq!(first.url.as_deref(), Some("http://arxiv.org/abs/2401.01234v1"));

        assert!(papers[1].authors.is_empty());
        assert!(papers[1].doi.is_none());
    }

    #[test]
    fn test_parse_invalid_xml() {
        assert!(matches!(
            ArxivSource::parse_feed("<feed"),
            Err(SourceError::Parse(_))
        ));
    }
}
