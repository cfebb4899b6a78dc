// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::models::paper::Paper;

static NUMERIC_CITATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+(?:,\s*\d+)*)\]").expect("Failed to compile numeric citation regex")
});

static REFERENCES_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)REFERENCES\s*={60,}\s*(.*)$").expect("Failed to compile references regex")
});

static REFERENCE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+)\]\s*(.*)").expect("Failed to compile reference line regex")
});

/// APA 作者列表中完整列出的最大作者数
const APA_MAX_LISTED_AUTHORS: usize = 20;

/// 生成引用键
///
/// 第一作者姓氏（最后一个词，缺省为 `Unknown`）+ 年份（缺省 `n.d.`）+
/// 标题前三个词的首字母大写形式，例如 `Smith2023DeepLearningFor`
pub fn citation_key(authors: &[String], year: Option<i32>, title: &str) -> String {
    let first_author = authors
        .first()
        .and_then(|a| a.split_whitespace().last())
        .unwrap_or("Unknown");
    let year = year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());
    let title_part: String = title.split_whitespace().take(3).map(capitalize).collect();

    format!("{first_author}{year}{title_part}")
}

/// 首字母大写，其余小写
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// APA 格式的作者列表
fn apa_authors(authors: &[String]) -> String {
    match authors.len() {
        0 => "Unknown".to_string(),
        1 => authors[0].clone(),
        2 => format!("{} & {}", authors[0], authors[1]),
        n if n <= APA_MAX_LISTED_AUTHORS => {
            format!("{}, & {}", authors[..n - 1].join(", "), authors[n - 1])
        }
        n => format!("{}, ... {}", authors[..19].join(", "), authors[n - 1]),
    }
}

/// 格式化 APA 引用
pub fn format_apa(paper: &Paper) -> String {
    let mut citation = format!(
        "{} ({}). {}.",
        apa_authors(&paper.authors),
        paper.year_label(),
        paper.title
    );

    if let Some(doi) = paper.doi() {
        citation.push_str(&format!(" https://doi.org/{doi}"));
    } else if let Some(url) = paper.url.as_deref().filter(|u| !u.is_empty()) {
        citation.push_str(&format!(" {url}"));
    }

    citation
}

/// 生成 BibTeX 条目
pub fn format_bibtex(paper: &Paper) -> String {
    let key = citation_key(&paper.authors, paper.year, &paper.title);
    let authors = if paper.authors.is_empty() {
        "Unknown".to_string()
    } else {
        paper.authors.join(" and ")
    };

    let mut extra_fields = String::new();
    if let Some(arxiv_id) = paper.arxiv_id.as_deref().filter(|id| !id.is_empty()) {
        extra_fields.push_str(&format!(
            "  eprint = {{{arxiv_id}}},\n  archivePrefix = {{arXiv}},\n"
        ));
    }
    if let Some(doi) = paper.doi() {
        extra_fields.push_str(&format!("  doi = {{{doi}}},\n"));
    }

    format!(
        "@article{{{key},\n  author = {{{authors}}},\n  title = {{{}}},\n  year = {{{}}},\n{extra_fields}}}",
        paper.title,
        paper.year_label()
    )
}

/// 提案正文中的数字引用信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericCitations {
    /// `REFERENCES` 分隔线之后的全部文本
    pub references_section: String,
    /// 编号到参考文献文本
    pub citation_map: BTreeMap<u32, String>,
    /// 正文中出现过的编号，升序
    pub used_citations: Vec<u32>,
}

/// 文本中所有 `[n]` 与 `[n, m]` 形式引用的编号
pub fn citation_numbers(text: &str) -> BTreeSet<u32> {
    NUMERIC_CITATION_REGEX
        .captures_iter(text)
        .flat_map(|caps| {
            caps[1]
                .split(',')
                .filter_map(|n| n.trim().parse::<u32>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// 抽取正文中的数字引用与 `REFERENCES` 块
pub fn extract_numeric_citations(text: &str) -> NumericCitations {
    let references_section = REFERENCES_BLOCK_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let citation_map = references_section
        .lines()
        .filter_map(|line| {
            let caps = REFERENCE_LINE_REGEX.captures(line.trim())?;
            let number = caps[1].parse::<u32>().ok()?;
            Some((number, caps[2].to_string()))
        })
        .collect();

    NumericCitations {
        references_section,
        citation_map,
        used_citations: citation_numbers(text).into_iter().collect(),
    }
}

/// 返回不在允许列表中的引用编号，升序且不重复
pub fn invalid_citations(text: &str, allowed: &[u32]) -> Vec<u32> {
    citation_numbers(text)
        .into_iter()
        .filter(|n| !allowed.contains(n))
        .collect()
}

/// 删除无效编号
///
/// 分组引用只保留有效编号，全部无效时整个方括号被删除
pub fn strip_citations(text: &str, invalid: &[u32]) -> String {
    if invalid.is_empty() {
        return text.to_string();
    }

    NUMERIC_CITATION_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let kept: Vec<&str> = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|n| {
                    n.parse::<u32>()
                        .map(|num| !invalid.contains(&num))
                        .unwrap_or(true)
                })
                .collect();
            if kept.is_empty() {
                String::new()
            } else {
                format!("[{}]", kept.join(", "))
            }
        })
        .into_owned()
}
