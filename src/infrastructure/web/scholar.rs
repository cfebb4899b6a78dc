// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{build_client, fetch_html};
use crate::config::settings::WebSettings;
use crate::domain::models::paper::Paper;
use crate::domain::search::source::{PaperSource, SourceError};
use crate::utils::text_processing::clean_scraped_text;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gs_ri").expect("Failed to compile result selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gs_rt").expect("Failed to compile title selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile link selector"));
static AUTHORS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gs_a").expect("Failed to compile authors selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gs_rs").expect("Failed to compile snippet selector"));
static FOOTER_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gs_fl a").expect("Failed to compile footer selector"));

static BRACKET_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("Failed to compile bracket regex"));
static YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("Failed to compile year regex"));
static CITED_BY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Cited by (\d+)").expect("Failed to compile cited-by regex"));

/// Google Scholar 结果页检索源
pub struct ScholarSource {
    client: reqwest::Client,
    base_url: String,
}

impl ScholarSource {
    pub fn new(settings: &WebSettings) -> Self {
        Self {
            client: build_client(settings),
            base_url: settings.scholar_url.clone(),
        }
    }

    /// 解析 Scholar 结果页（用于单元测试）
    pub fn parse_results(html: &str, limit: usize) -> Vec<Paper> {
        let document = Html::parse_document(html);
        document
            .select(&RESULT_SELECTOR)
            .take(limit)
            .enumerate()
            .filter_map(|(idx, element)| Self::parse_result(idx, element))
            .collect()
    }

    fn parse_result(idx: usize, element: ElementRef<'_>) -> Option<Paper> {
        let title_elem = element.select(&TITLE_SELECTOR).next();
        let raw_title = title_elem
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default();
        let title = clean_scraped_text(&BRACKET_TAG_REGEX.replace_all(&raw_title, ""));
        if title.is_empty() {
            return None;
        }

        let url = title_elem
            .and_then(|e| e.select(&LINK_SELECTOR).next())
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        let byline = element
            .select(&AUTHORS_SELECTOR)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default();
        // Byline reads "A Author, B Author - Venue, 2021 - publisher"
        let authors = byline
            .split('-')
            .next()
            .map(|names| {
                names
                    .split(',')
                    .map(clean_scraped_text)
                    .filter(|n| !n.is_empty() && n != "…")
                    .collect()
            })
            .unwrap_or_default();
        let year = YEAR_REGEX
            .find(&byline)
            .and_then(|m| m.as_str().parse().ok());

        let abstract_text = element
            .select(&SNIPPET_SELECTOR)
            .next()
            .map(|e| clean_scraped_text(&e.text().collect::<String>()))
            .unwrap_or_default();

        let citation_count = element
            .select(&FOOTER_LINK_SELECTOR)
            .filter_map(|a| {
                let text = a.text().collect::<String>();
                CITED_BY_REGEX
                    .captures(&text)
                    .and_then(|c| c[1].parse::<u32>().ok())
            })
            .next()
            .unwrap_or(0);

        Some(Paper {
            source: "Google Scholar".to_string(),
            source_id: format!("scholar-{}", idx + 1),
            title,
            authors,
            year,
            abstract_text,
            url,
            citation_count,
            ..Default::default()
        })
    }
}

#[async_trait]
impl PaperSource for ScholarSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError> {
        let html = fetch_html(
            &self.client,
            self.name(),
            &self.base_url,
            &[("q", query), ("hl", "en")],
        )
        .await?;

        let papers = Self::parse_results(&html, limit as usize);
        debug!("Google Scholar returned {} results", papers.len());
        Ok(papers)
    }

    fn name(&self) -> &'static str {
        "google_scholar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="gs_r"><div class="gs_ri">
            <h3 class="gs_rt"><span>[PDF]</span> <a href="https://example.org/soil.pdf">Soil carbon &amp; climate</a></h3>
            <div class="gs_a">A Smith, B Jones - Nature Climate, 2021 - nature.com</div>
            <div class="gs_rs">Soils store a large share of terrestrial carbon.</div>
            <div class="gs_fl"><a href="/cites">Cited by 42</a><a href="/related">Related articles</a></div>
        </div></div>
        <div class="gs_r"><div class="gs_ri">
            <h3 class="gs_rt">[CITATION] Untitled note without link</h3>
            <div class="gs_a">C Wu</div>
        </div></div>
    </body></html>"#;

    #[test]
    fn test_parse_results() {
        let papers = ScholarSource::parse_results(PAGE, 10);
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.title, "Soil carbon & climate");
        assert_eq!(first.url.as_deref(), Some("https://example.org/soil.pdf"));
        assert_eq!(first.authors, vec!["A Smith", "B Jones"]);
        assert_eq!(first.year, Some(2021));
        assert_eq!(first.citation_count, 42);
        assert!(first.abstract_text.starts_with("Soils store"));

        let second = &papers[1];
        assert_eq!(second.title, "Untitled note without link");
        assert!(second.url.is_none());
        assert!(second.year.is_none());
        assert_eq!(second.citation_count, 0);
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(ScholarSource::parse_results(PAGE, 1).len(), 1);
    }
}
