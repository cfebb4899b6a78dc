// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::paper::Paper;
use crate::domain::models::research::WebItem;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected status {status} from {source_name}")]
    Status { source_name: String, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Search the source and return at most `limit` papers
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, SourceError>;

    /// Display name, also used as the key in source counts
    fn name(&self) -> &'static str;
}

/// 返回网页条目（新闻、学术新闻）的来源
#[async_trait]
pub trait WebSource: Send + Sync {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<WebItem>, SourceError>;

    fn name(&self) -> &'static str;
}

/// 抽取单个网页正文
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<WebItem, SourceError>;
}
