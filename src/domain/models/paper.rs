// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 学术论文记录
///
/// 各检索源解析后的统一表示，用于去重、排序、引用生成与提示词构建
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    /// 来源名称（arXiv、OpenAlex、Semantic Scholar、Crossref、Google Scholar）
    pub source: String,
    /// 来源内部标识
    pub source_id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// 发表年份，未知时为空
    pub year: Option<i32>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: Option<String>,
    /// 不带 `https://doi.org/` 前缀的 DOI
    pub doi: Option<String>,
    pub arxiv_id: Option<String>,
    pub venue: Option<String>,
    /// 被引次数
    pub citation_count: u32,
    /// 主题概念（OpenAlex concepts 或 arXiv categories）
    pub concepts: Vec<String>,
    /// 排序得分
    #[serde(default)]
    pub relevance_score: f64,
    /// 引用键，由引用服务生成
    #[serde(default)]
    pub citation_key: String,
}

impl Paper {
    /// 年份的文本形式，未知时为 `n.d.`
    pub fn year_label(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n.d.".to_string())
    }

    /// 非空 DOI
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// 标题与摘要拼接后的文本
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text)
    }
}
