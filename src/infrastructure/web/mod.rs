// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 网页抓取检索源
//!
//! Google Scholar 结果页、ScienceDaily 搜索、BBC 与 Guardian 新闻搜索，以及任意网页正文抽取

pub mod news;
pub mod page_extractor;
pub mod scholar;
pub mod science_daily;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use std::time::Duration;

use crate::config::settings::WebSettings;
use crate::domain::search::source::SourceError;
use crate::utils::text_encoding::decode_body;

/// 构建网页抓取用的 HTTP 客户端
pub(crate) fn build_client(settings: &WebSettings) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()
        .unwrap_or_default()
}

/// GET 一个 HTML 页面并解码为 UTF-8
pub(crate) async fn fetch_html(
    client: &reqwest::Client,
    source_name: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .query(query)
        .header(ACCEPT, "text/html,application/xhtml+xml")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::Status {
            source_name: source_name.to_string(),
            status: response.status().as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;
    Ok(decode_body(&bytes, content_type.as_deref()))
}
