// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::{build_client, fetch_html};
use crate::config::settings::WebSettings;
use crate::domain::models::research::{WebItem, WebItemKind};
use crate::domain::search::source::{PageExtractor, SourceError, WebSource};

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile link selector"));

/// 每个新闻站点最多抽取的文章数
pub const MAX_ARTICLES_PER_SITE: usize = 5;

/// 新闻站点搜索：抓取搜索结果页中指向本站的文章链接并抽取正文
pub struct NewsSource {
    name: &'static str,
    display_name: String,
    search_url: String,
    client: reqwest::Client,
    extractor: Arc<dyn PageExtractor>,
}

impl NewsSource {
    pub fn new(
        name: &'static str,
        display_name: &str,
        search_url: &str,
        settings: &WebSettings,
        extractor: Arc<dyn PageExtractor>,
    ) -> Self {
        Self {
            name,
            display_name: display_name.to_string(),
            search_url: search_url.to_string(),
            client: build_client(settings),
            extractor,
        }
    }

    pub fn bbc(settings: &WebSettings, extractor: Arc<dyn PageExtractor>) -> Self {
        Self::new("bbc", "BBC News", &settings.bbc_search_url, settings, extractor)
    }

    pub fn guardian(settings: &WebSettings, extractor: Arc<dyn PageExtractor>) -> Self {
        Self::new(
            "guardian",
            "The Guardian",
            &settings.guardian_search_url,
            settings,
            extractor,
        )
    }

    /// 从搜索结果页收集同站文章链接（去重，跳过搜索页本身）
    pub fn article_links(html: &str, search_url: &str, limit: usize) -> Vec<String> {
        let Ok(base) = Url::parse(search_url) else {
            return Vec::new();
        };
        let domain = base
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default();

        let document = Html::parse_document(html);
        let mut links: Vec<String> = Vec::new();
        for anchor in document.select(&LINK_SELECTOR) {
            if links.len() >= limit {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(mut resolved) = base.join(href) else {
                continue;
            };
            resolved.set_fragment(None);

            let same_site = resolved
                .host_str()
                .is_some_and(|host| host.ends_with(&domain));
            let is_search_page = resolved.path() == base.path();
            let link = String::from(resolved);
            if same_site && !is_search_page && !links.contains(&link) {
                links.push(link);
            }
        }
        links
    }
}

#[async_trait]
impl WebSource for NewsSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<WebItem>, SourceError> {
        let html = fetch_html(&self.client, self.name, &self.search_url, &[("q", query)]).await?;
        let links = Self::article_links(&html, &self.search_url, limit.min(MAX_ARTICLES_PER_SITE));
        debug!("{} search yielded {} article links", self.display_name, links.len());

        let extracted = join_all(links.iter().map(|url| self.extractor.extract(url))).await;
        let items = extracted
            .into_iter()
            .zip(links.iter())
            .filter_map(|(result, url)| match result {
                Ok(mut item) => {
                    item.source = self.display_name.clone();
                    item.kind = WebItemKind::News;
                    Some(item)
                }
                Err(e) => {
                    warn!("Failed to extract {} article {}: {}", self.display_name, url, e);
                    None
                }
            })
            .collect();

        Ok(items)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
