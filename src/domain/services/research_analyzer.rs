// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use crate::domain::models::paper::Paper;
use crate::domain::models::research::{
    Bibliography, ResearchContext, Researcher, TermCount, Theme, WebItem,
};
use crate::domain::services::citation_service;

/// 方法学关键词，大小写不敏感匹配
pub const METHODOLOGY_KEYWORDS: &[&str] = &[
    "neural network",
    "deep learning",
    "machine learning",
    "CNN",
    "RNN",
    "LSTM",
    "transformer",
    "GAN",
    "reinforcement learning",
    "supervised learning",
    "unsupervised learning",
    "semi-supervised",
    "transfer learning",
    "survey",
    "experiment",
    "case study",
    "interview",
    "ethnography",
    "meta-analysis",
    "systematic review",
    "RCT",
    "longitudinal study",
];

/// 数据集关键词，大小写敏感匹配
pub const DATASET_KEYWORDS: &[&str] = &[
    "ImageNet",
    "COCO",
    "MNIST",
    "CIFAR",
    "Pascal VOC",
    "FaceForensics",
    "Celeb-DF",
    "DFDC",
    "DeepFake",
    "SQuAD",
    "GLUE",
    "SuperGLUE",
    "WikiText",
    "BookCorpus",
    "Common Crawl",
    "LAION",
    "OpenImages",
];

/// 提示研究空白的短语
pub const GAP_PHRASES: &[&str] = &[
    "however",
    "limited",
    "few studies",
    "gap",
    "challenge",
    "open problem",
    "future work",
    "remains unclear",
    "poorly understood",
    "needs further",
];

const GAP_SCAN_PAPERS: usize = 20;
const MAX_GAPS: usize = 10;
const MAX_KEY_RESEARCHERS: usize = 20;

/// 检索结果之外的附加输入
#[derive(Debug, Default)]
pub struct AnalysisInputs {
    pub source_counts: BTreeMap<String, usize>,
    pub news: Vec<WebItem>,
    pub custom_content: Vec<WebItem>,
}

/// 研究分析器
///
/// 把排序后的论文整理为 [`ResearchContext`]：引用键、主题、方法、数据集、
/// 研究空白、时间线、核心研究者与参考文献
pub struct ResearchAnalyzer;

impl ResearchAnalyzer {
    pub fn analyze(query: &str, mut papers: Vec<Paper>, inputs: AnalysisInputs) -> ResearchContext {
        for paper in papers.iter_mut() {
            if paper.citation_key.is_empty() {
                paper.citation_key =
                    citation_service::citation_key(&paper.authors, paper.year, &paper.title);
            }
        }

        let bibliography = Bibliography {
            apa: papers.iter().map(citation_service::format_apa).collect(),
            bibtex: papers.iter().map(citation_service::format_bibtex).collect(),
        };

        ResearchContext {
            query: query.to_string(),
            total_papers: papers.len(),
            collected_at: Utc::now(),
            themes: Self::extract_themes(&papers),
            methodologies: Self::extract_methodologies(&papers),
            datasets: Self::extract_datasets(&papers),
            research_gaps: Self::identify_research_gaps(&papers),
            timeline: Self::research_timeline(&papers),
            key_researchers: Self::key_researchers(&papers),
            bibliography,
            source_counts: inputs.source_counts,
            news: inputs.news,
            custom_content: inputs.custom_content,
            papers,
        }
    }

    /// 概念或分类到引用键，按论文数降序
    pub fn extract_themes(papers: &[Paper]) -> Vec<Theme> {
        let mut order: Vec<String> = Vec::new();
        let mut keys: HashMap<String, Vec<String>> = HashMap::new();

        for paper in papers {
            for concept in &paper.concepts {
                let entry = keys.entry(concept.clone()).or_insert_with(|| {
                    order.push(concept.clone());
                    Vec::new()
                });
                entry.push(paper.citation_key.clone());
            }
        }

        let mut themes: Vec<Theme> = order
            .into_iter()
            .map(|name| {
                let citation_keys = keys.remove(&name).unwrap_or_default();
                Theme {
                    name,
                    citation_keys,
                }
            })
            .collect();
        // Stable: ties keep first-seen order
        themes.sort_by(|a, b| b.citation_keys.len().cmp(&a.citation_keys.len()));
        themes
    }

    /// 各方法学关键词出现的论文数，按次数降序
    pub fn extract_methodologies(papers: &[Paper]) -> Vec<TermCount> {
        let texts: Vec<String> = papers
            .iter()
            .map(|p| p.searchable_text().to_lowercase())
            .collect();
        count_terms(METHODOLOGY_KEYWORDS, |keyword| {
            let needle = keyword.to_lowercase();
            texts.iter().filter(|t| t.contains(&needle)).count()
        })
    }

    /// 各数据集关键词出现的论文数，按次数降序
    pub fn extract_datasets(papers: &[Paper]) -> Vec<TermCount> {
        let texts: Vec<String> = papers.iter().map(Paper::searchable_text).collect();
        count_terms(DATASET_KEYWORDS, |keyword| {
            texts.iter().filter(|t| t.contains(keyword)).count()
        })
    }

    /// 前 20 篇摘要中包含空白短语的首个句子，最多 10 条
    pub fn identify_research_gaps(papers: &[Paper]) -> Vec<String> {
        let mut gaps: Vec<String> = Vec::new();

        for paper in papers.iter().take(GAP_SCAN_PAPERS) {
            let lower = paper.abstract_text.to_lowercase();
            for phrase in GAP_PHRASES {
                if !lower.contains(phrase) {
                    continue;
                }
                let sentence = paper
                    .abstract_text
                    .split('.')
                    .map(str::trim)
                    .find(|s| s.to_lowercase().contains(phrase));
                if let Some(sentence) = sentence {
                    if !sentence.is_empty() && !gaps.iter().any(|g| g == sentence) {
                        gaps.push(sentence.to_string());
                    }
                }
            }
        }

        gaps.truncate(MAX_GAPS);
        gaps
    }

    /// 年份到论文数，忽略年份未知的论文
    pub fn research_timeline(papers: &[Paper]) -> BTreeMap<i32, usize> {
        let mut timeline = BTreeMap::new();
        for year in papers.iter().filter_map(|p| p.year) {
            *timeline.entry(year).or_insert(0) += 1;
        }
        timeline
    }

    /// 按论文数、总被引次数降序的前 20 位作者
    pub fn key_researchers(papers: &[Paper]) -> Vec<Researcher> {
        let mut order: Vec<String> = Vec::new();
        let mut stats: HashMap<String, Researcher> = HashMap::new();

        for paper in papers {
            for author in &paper.authors {
                let entry = stats.entry(author.clone()).or_insert_with(|| {
                    order.push(author.clone());
                    Researcher {
                        name: author.clone(),
                        paper_count: 0,
                        total_citations: 0,
                        papers: Vec::new(),
                    }
                });
                entry.paper_count += 1;
                entry.total_citations += u64::from(paper.citation_count);
                entry.papers.push(paper.citation_key.clone());
            }
        }

        let mut researchers: Vec<Researcher> = order
            .iter()
            .filter_map(|name| stats.remove(name))
            .collect();
        researchers.sort_by(|a, b| {
            (b.paper_count, b.total_citations).cmp(&(a.paper_count, a.total_citations))
        });
        researchers.truncate(MAX_KEY_RESEARCHERS);
        researchers
    }
}

fn count_terms(keywords: &[&str], count: impl Fn(&str) -> usize) -> Vec<TermCount> {
    let mut counts: Vec<TermCount> = keywords
        .iter()
        .filter_map(|keyword| {
            let n = count(keyword);
            (n > 0).then(|| TermCount {
                term: keyword.to_string(),
                count: n,
            })
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, abstract_text: &str, authors: &[&str], year: Option<i32>) -> Paper {
        Paper {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            year,
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_assigns_keys_and_bibliography() {
        let papers = vec![
            paper("Deep learning for crops", "A CNN on ImageNet.", &["Ann Lee"], Some(2022)),
            paper("Field survey", "A survey. However, data remains limited.", &["Bo Chan"], None),
        ];
        let ctx = ResearchAnalyzer::analyze("crops", papers, AnalysisInputs::default());

        assert_eq!(ctx.total_papers, 2);
        assert_eq!(ctx.papers[0].citation_key, "Lee2022DeepLearningFor");
        assert_eq!(ctx.bibliography.apa.len(), 2);
        assert_eq!(ctx.bibliography.bibtex.len(), 2);
        assert_eq!(ctx.timeline.len(), 1);
        assert_eq!(ctx.timeline[&2022], 1);
        assert!(ctx.paper_by_key("Lee2022DeepLearningFor").is_some());
    }

    #[test]
    fn test_themes_sorted_by_frequency() {
        let mut a = paper("A", "", &[], None);
        a.citation_key = "a".into();
        a.concepts = vec!["Biology".into(), "Physics".into()];
        let mut b = paper("B", "", &[], None);
        b.citation_key = "b".into();
        b.concepts = vec!["Physics".into()];

        let themes = ResearchAnalyzer::extract_themes(&[a, b]);
        assert_eq!(themes[0].name, "Physics");
        assert_eq!(themes[0].citation_keys, vec!["a", "b"]);
        assert_eq!(themes[1].name, "Biology");
    }

    #[test]
    fn test_methodologies_case_insensitive_datasets_case_sensitive() {
        let papers = vec![
            paper("A Transformer model", "Trained on imagenet with deep learning", &[], None),
            paper("Deep Learning again", "Evaluated on ImageNet", &[], None),
        ];

        let methods = ResearchAnalyzer::extract_methodologies(&papers);
        assert_eq!(methods[0], TermCount { term: "deep learning".into(), count: 2 });
        assert!(methods.iter().any(|m| m.term == "transformer" && m.count == 1));

        let datasets = ResearchAnalyzer::extract_datasets(&papers);
        assert_eq!(datasets, vec![TermCount { term: "ImageNet".into(), count: 1 }]);
    }

    #[test]
    fn test_research_gaps_take_first_matching_sentence() {
        let papers = vec![paper(
            "T",
            "We propose a method. However, robustness is poorly understood. Future work is needed",
            &[],
            None,
        )];
        let gaps = ResearchAnalyzer::identify_research_gaps(&papers);
        assert_eq!(
            gaps,
            vec![
                "However, robustness is poorly understood".to_string(),
                "Future work is needed".to_string(),
            ]
        );
    }

    #[test]
    fn test_key_researchers_ordering() {
        let mut p1 = paper("One", "", &["X", "Y"], None);
        p1.citation_count = 5;
        let mut p2 = paper("Two", "", &["Y", "Z"], None);
        p2.citation_count = 100;
        let mut p3 = paper("Three", "", &["X"], None);
        p3.citation_count = 1;

        let researchers = ResearchAnalyzer::key_researchers(&[p1, p2, p3]);
        assert_eq!(researchers[0].name, "Y");
        assert_eq!(researchers[0].total_citations, 105);
        assert_eq!(researchers[1].name, "X");
        assert_eq!(researchers[2].name, "Z");
    }
}
