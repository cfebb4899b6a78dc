// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::paper::Paper;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 检索选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOptions {
    /// 是否抓取新闻来源（BBC、Guardian）
    pub include_news: bool,
    /// 是否抓取 Google Scholar 与 ScienceDaily
    pub include_web: bool,
    /// 需要抽取正文的自定义网址
    pub custom_urls: Vec<String>,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            include_news: true,
            include_web: true,
            custom_urls: Vec::new(),
        }
    }
}

/// 主题及其关联的引用键
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub name: String,
    pub citation_keys: Vec<String>,
}

/// 关键词计数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// 核心研究者
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Researcher {
    pub name: String,
    pub paper_count: usize,
    pub total_citations: u64,
    pub papers: Vec<String>,
}

/// 参考文献（APA 与 BibTeX）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bibliography {
    pub apa: Vec<String>,
    pub bibtex: Vec<String>,
}

/// 网页条目（新闻、学术新闻、自定义网址）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebItem {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub date: Option<String>,
    pub kind: WebItemKind,
}

/// 网页条目类型
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebItemKind {
    #[default]
    WebArticle,
    News,
    AcademicNews,
}

/// 结构化研究上下文
///
/// 检索、去重、排序与分析的最终产物，是生成提示词的依据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchContext {
    pub query: String,
    pub total_papers: usize,
    pub collected_at: DateTime<Utc>,
    /// 按得分降序排列的论文
    pub papers: Vec<Paper>,
    /// 按出现频次降序排列的主题
    pub themes: Vec<Theme>,
    pub methodologies: Vec<TermCount>,
    pub datasets: Vec<TermCount>,
    pub research_gaps: Vec<String>,
    /// 年份到论文数，升序
    pub timeline: BTreeMap<i32, usize>,
    pub key_researchers: Vec<Researcher>,
    pub bibliography: Bibliography,
    /// 每个来源贡献的论文数（去重前）
    pub source_counts: BTreeMap<String, usize>,
    pub news: Vec<WebItem>,
    pub custom_content: Vec<WebItem>,
}

impl ResearchContext {
    /// 按引用键查找论文
    pub fn paper_by_key(&self, key: &str) -> Option<&Paper> {
        self.papers.iter().find(|p| p.citation_key == key)
    }
}
