// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{build_client, fetch_html};
use crate::config::settings::WebSettings;
use crate::domain::models::research::{WebItem, WebItemKind};
use crate::domain::search::source::{SourceError, WebSource};
use crate::utils::text_processing::clean_scraped_text;

static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".search-result").expect("Failed to compile item selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3 a").expect("Failed to compile title selector"));
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".summary").expect("Failed to compile summary selector"));
static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".date").expect("Failed to compile date selector"));

/// ScienceDaily 学术新闻搜索
pub struct ScienceDailySource {
    client: reqwest::Client,
    search_url: String,
}

impl ScienceDailySource {
    pub fn new(settings: &WebSettings) -> Self {
        Self {
            client: build_client(settings),
            search_url: settings.science_daily_url.clone(),
        }
    }

    /// 解析搜索结果页，相对链接基于 `base_url` 补全
    pub fn parse_results(html: &str, base_url: &str, limit: usize) -> Vec<WebItem> {
        let base = Url::parse(base_url).ok();
        let document = Html::parse_document(html);
        let text_of = |element: Option<scraper::ElementRef<'_>>| {
            element
                .map(|e| clean_scraped_text(&e.text().collect::<String>()))
                .unwrap_or_default()
        };

        document
            .select(&ITEM_SELECTOR)
            .take(limit)
            .filter_map(|item| {
                let title_elem = item.select(&TITLE_SELECTOR).next()?;
                let title = text_of(Some(title_elem));
                let href = title_elem.value().attr("href").unwrap_or_default();
                let url = match &base {
                    Some(base) => base.join(href).map(String::from).unwrap_or_default(),
                    None => href.to_string(),
                };
                let date = text_of(item.select(&DATE_SELECTOR).next());

                Some(WebItem {
                    title,
                    content: text_of(item.select(&SUMMARY_SELECTOR).next()),
                    url,
                    source: "ScienceDaily".to_string(),
                    date: (!date.is_empty()).then_some(date),
                    kind: WebItemKind::AcademicNews,
                })
            })
            .collect()
    }
}

#[async_trait]
impl WebSource for ScienceDailySource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<WebItem>, SourceError> {
        let html = fetch_html(
            &self.client,
            self.name(),
            &self.search_url,
            &[("keyword", query)],
        )
        .await?;

        let items = Self::parse_results(&html, &self.search_url, limit);
        debug!("ScienceDaily returned {} articles", items.len());
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "science_daily"
    }
}
