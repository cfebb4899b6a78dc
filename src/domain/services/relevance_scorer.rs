// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Datelike, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::models::paper::Paper;

/// 标题命中一个查询词的得分
const TITLE_TERM_WEIGHT: f64 = 10.0;
/// 摘要命中一个查询词的得分
const ABSTRACT_TERM_WEIGHT: f64 = 2.0;
/// 被引次数得分上限
const MAX_CITATION_SCORE: f64 = 10.0;

/// 论文相关性评分器
///
/// 综合查询词重合度、被引次数与发表时间给论文打分
pub struct RelevanceScorer {
    query_terms: HashSet<String>,
    current_year: i32,
}

impl RelevanceScorer {
    pub fn new(query: &str) -> Self {
        Self {
            query_terms: term_set(query),
            current_year: Utc::now().year(),
        }
    }

    /// 固定参考年份，便于测试
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Calculate relevance score for a paper
    pub fn calculate_score(&self, paper: &Paper) -> f64 {
        let title_terms = term_set(&paper.title);
        let abstract_terms = term_set(&paper.abstract_text);

        let title_overlap = self.query_terms.intersection(&title_terms).count() as f64;
        let abstract_overlap = self.query_terms.intersection(&abstract_terms).count() as f64;

        let mut score = title_overlap * TITLE_TERM_WEIGHT + abstract_overlap * ABSTRACT_TERM_WEIGHT;
        score += (paper.citation_count as f64 / 100.0).min(MAX_CITATION_SCORE);

        if let Some(year) = paper.year {
            score += self.freshness_score(year);
        }

        score
    }

    /// 发表年份的新鲜度得分
    pub fn freshness_score(&self, year: i32) -> f64 {
        match self.current_year - year {
            age if age <= 3 => 5.0,
            age if age <= 5 => 3.0,
            age if age <= 10 => 1.0,
            _ => 0.0,
        }
    }

    /// 打分并按得分降序排列，只保留前 `limit` 篇
    pub fn rank(&self, mut papers: Vec<Paper>, limit: usize) -> Vec<Paper> {
        for paper in papers.iter_mut() {
            paper.relevance_score = self.calculate_score(paper);
        }

        // Stable sort keeps retrieval order among equal scores
        papers.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        });
        papers.truncate(limit);
        papers
    }
}

fn term_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, abstract_text: &str, year: Option<i32>, cites: u32) -> Paper {
        Paper {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            year,
            citation_count: cites,
            ..Default::default()
        }
    }

    #[test]
    fn test_relevance_scoring() {
        let scorer = RelevanceScorer::new("graph neural networks").with_current_year(2025);

        // 2 title terms, 1 abstract term, 250 citations, 2 years old
        let p = paper(
            "Neural networks on sparse data",
            "We study graph structure",
            Some(2023),
            250,
        );
        assert_eq!(scorer.calculate_score(&p), 20.0 + 2.0 + 2.5 + 5.0);
    }

    #[test]
    fn test_citation_score_is_capped() {
        let scorer = RelevanceScorer::new("unrelated").with_current_year(2025);
        let p = paper("Title", "", None, 50_000);
        assert_eq!(scorer.calculate_score(&p), 10.0);
    }

    #[test]
    fn test_freshness_score() {
        let scorer = RelevanceScorer::new("x").with_current_year(2025);
        assert_eq!(scorer.freshness_score(2022), 5.0);
        assert_eq!(scorer.freshness_score(2020), 3.0);
        assert_eq!(scorer.freshness_score(2015), 1.0);
        assert_eq!(scorer.freshness_score(2014), 0.0);
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let scorer = RelevanceScorer::new("climate").with_current_year(2025);
        let papers = vec![
            paper("Other topic", "", Some(1990), 0),
            paper("Climate change", "climate", Some(2024), 0),
            paper("Something", "about climate", Some(1990), 0),
        ];

        let ranked = scorer.rank(papers, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "Climate change");
        assert_eq!(ranked[1].title, "Something");
        assert!(ranked[0].relevance_score > ranked[1].relevance_score);
    }
}
