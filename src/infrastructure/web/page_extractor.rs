// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::{build_client, fetch_html};
use crate::config::settings::WebSettings;
use crate::domain::models::research::{WebItem, WebItemKind};
use crate::domain::search::source::{PageExtractor, SourceError};
use crate::utils::text_processing::{clean_scraped_text, truncate_chars};

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile title selector"));
static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("Failed to compile og:title selector")
});
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("Failed to compile h1 selector"));
static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#)
        .expect("Failed to compile description selector")
});
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("Failed to compile time selector"));

// Tried in order; the first container yielding paragraphs wins
static PARAGRAPH_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article p", "main p", "p"]
        .iter()
        .map(|s| Selector::parse(s).expect("Failed to compile paragraph selector"))
        .collect()
});

const MIN_PARAGRAPH_CHARS: usize = 40;
const MAX_CONTENT_CHARS: usize = 5000;

/// 通用网页正文抽取：标题、meta 描述与主体段落
pub struct HtmlPageExtractor {
    client: reqwest::Client,
}

impl HtmlPageExtractor {
    pub fn new(settings: &WebSettings) -> Self {
        Self {
            client: build_client(settings),
        }
    }

    /// 解析页面（用于单元测试）
    pub fn parse_page(html: &str, url: &str) -> WebItem {
        let document = Html::parse_document(html);
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(|e| clean_scraped_text(&e.text().collect::<String>()))
                .filter(|t| !t.is_empty())
        };
        let meta_content = |selector: &Selector| {
            document
                .select(selector)
                .filter_map(|e| e.value().attr("content"))
                .map(clean_scraped_text)
                .find(|t| !t.is_empty())
        };

        let title = meta_content(&OG_TITLE_SELECTOR)
            .or_else(|| first_text(&TITLE_SELECTOR))
            .or_else(|| first_text(&H1_SELECTOR))
            .unwrap_or_else(|| url.to_string());

        let paragraphs: Vec<String> = PARAGRAPH_SELECTORS
            .iter()
            .map(|selector| {
                document
                    .select(selector)
                    .map(|p| clean_scraped_text(&p.text().collect::<String>()))
                    .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let mut blocks = Vec::new();
        if let Some(description) = meta_content(&DESCRIPTION_SELECTOR) {
            blocks.push(description);
        }
        blocks.extend(paragraphs);

        let date = document
            .select(&TIME_SELECTOR)
            .next()
            .and_then(|e| e.value().attr("datetime"))
            .map(str::to_string);

        WebItem {
            title,
            content: truncate_chars(&blocks.join("\n\n"), MAX_CONTENT_CHARS),
            url: url.to_string(),
            source: Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default(),
            date,
            kind: WebItemKind::WebArticle,
        }
    }
}

#[async_trait]
impl PageExtractor for HtmlPageExtractor {
    async fn extract(&self, url: &str) -> Result<WebItem, SourceError> {
        Url::parse(url).map_err(|e| SourceError::Parse(format!("invalid url {url}: {e}")))?;
        let html = fetch_html(&self.client, "page", url, &[]).await?;
        Ok(Self::parse_page(&html, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_prefers_article_paragraphs() {
        let html = r#"<html><head>
                <title>Fallback title</title>
                <meta property="og:title" content="Soil Carbon Report">
                <meta name="description" content="A summary of soil carbon findings.">
            </head><body>
                <nav><p>Navigation text that is long enough to count as a paragraph.</p></nav>
                <article>
                    <time datetime="2024-03-01">March</time>
                    <p>Short.</p>
                    <p>Soil organic carbon increased under cover crops in every trial plot.</p>
                </article>
            </body></html>"#;

        let item = HtmlPageExtractor::parse_page(html, "https://news.example.org/soil");
        assert_eq!(item.title, "Soil Carbon Report");
        assert_eq!(item.source, "news.example.org");
        assert_eq!(item.date.as_deref(), Some("2024-03-01"));
        assert_eq!(
            item.content,
            "A summary of soil carbon findings.\n\nSoil organic carbon increased under cover crops in every trial plot."
        );
    }

    #[test]
    fn test_parse_page_without_metadata() {
        let item = HtmlPageExtractor::parse_page("<html><body></body></html>", "https://x.org/a");
        assert_eq!(item.title, "https://x.org/a");
        assert!(item.content.is_empty());
    }
}
