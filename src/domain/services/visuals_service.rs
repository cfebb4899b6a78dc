// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use crate::domain::models::research::ResearchContext;
use crate::domain::models::visuals::{Visual, VisualKind, VisualSet};

/// 默认工作计划：(任务, 开始月份, 持续月数)
const DEFAULT_TASKS: &[(&str, u32, u32)] = &[
    ("Literature Review", 0, 3),
    ("Method Development", 2, 6),
    ("Data Collection", 6, 8),
    ("Analysis & Results", 12, 6),
    ("Paper Writing", 16, 4),
    ("Final Review", 19, 2),
];

/// 默认预算（美元）
const DEFAULT_BUDGET: &[(&str, u64)] = &[
    ("Personnel", 150_000),
    ("Equipment", 80_000),
    ("Materials & Supplies", 30_000),
    ("Travel", 20_000),
    ("Publication Costs", 10_000),
    ("Overhead", 60_000),
];

/// 由研究上下文生成全部图表
///
/// 缺少数据的图表（如无年份信息时的时间线）会被跳过，工作计划与预算始终生成
pub fn generate_all(ctx: &ResearchContext) -> VisualSet {
    let figures = [
        research_timeline(ctx),
        methodology_distribution(ctx),
        research_impact(ctx),
        Some(work_plan_gantt()),
        Some(budget_breakdown()),
    ]
    .into_iter()
    .flatten()
    .collect();

    VisualSet {
        figures,
        tables: comparison_table(ctx).into_iter().collect(),
    }
}

pub fn research_timeline(ctx: &ResearchContext) -> Option<Visual> {
    let first = *ctx.timeline.keys().next()?;
    let last = *ctx.timeline.keys().next_back()?;
    let total: usize = ctx.timeline.values().sum();

    Some(Visual {
        id: "timeline".into(),
        kind: VisualKind::Figure,
        title: "Research Publication Timeline".into(),
        caption: format!(
            "Figure 1: Research publication timeline showing {total} papers published between {first} and {last}."
        ),
        headers: vec!["Year".into(), "Papers".into()],
        rows: ctx
            .timeline
            .iter()
            .map(|(year, count)| vec![year.to_string(), count.to_string()])
            .collect(),
    })
}

pub fn methodology_distribution(ctx: &ResearchContext) -> Option<Visual> {
    if ctx.methodologies.is_empty() {
        return None;
    }
    let top: Vec<_> = ctx.methodologies.iter().take(10).collect();

    Some(Visual {
        id: "methodology".into(),
        kind: VisualKind::Figure,
        title: "Research Methodology Distribution".into(),
        caption: format!(
            "Figure 2: Distribution of research methodologies found in {} most common approaches.",
            top.len()
        ),
        headers: vec!["Methodology".into(), "Papers".into()],
        rows: top
            .iter()
            .map(|m| vec![m.term.clone(), m.count.to_string()])
            .collect(),
    })
}

pub fn research_impact(ctx: &ResearchContext) -> Option<Visual> {
    if ctx.papers.is_empty() {
        return None;
    }
    let mut papers: Vec<_> = ctx.papers.iter().collect();
    papers.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    papers.truncate(10);

    Some(Visual {
        id: "impact".into(),
        kind: VisualKind::Figure,
        title: "Research Impact Analysis".into(),
        caption: format!(
            "Figure 3: Research impact analysis showing citation patterns across {} papers.",
            papers.len()
        ),
        headers: vec!["Paper".into(), "Year".into(), "Citations".into()],
        rows: papers
            .iter()
            .map(|p| {
                vec![
                    short_title(&p.title),
                    p.year_label(),
                    p.citation_count.to_string(),
                ]
            })
            .collect(),
    })
}

pub fn work_plan_gantt() -> Visual {
    let months = DEFAULT_TASKS
        .iter()
        .map(|(_, start, duration)| start + duration)
        .max()
        .unwrap_or(0);

    Visual {
        id: "gantt".into(),
        kind: VisualKind::Figure,
        title: "Project Work Plan".into(),
        caption: format!(
            "Figure 4: Project timeline showing {} major tasks over {months} months.",
            DEFAULT_TASKS.len()
        ),
        headers: vec![
            "Task".into(),
            "Start Month".into(),
            "Duration (months)".into(),
            "End Month".into(),
        ],
        rows: DEFAULT_TASKS
            .iter()
            .map(|(task, start, duration)| {
                vec![
                    task.to_string(),
                    start.to_string(),
                    duration.to_string(),
                    (start + duration).to_string(),
                ]
            })
            .collect(),
    }
}

pub fn budget_breakdown() -> Visual {
    let total: u64 = DEFAULT_BUDGET.iter().map(|(_, amount)| amount).sum();

    let mut rows: Vec<Vec<String>> = DEFAULT_BUDGET
        .iter()
        .map(|(category, amount)| {
            vec![
                category.to_string(),
                format!("${}", thousands(*amount)),
                format!("{:.1}%", *amount as f64 * 100.0 / total as f64),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        format!("${}", thousands(total)),
        "100.0%".into(),
    ]);

    Visual {
        id: "budget".into(),
        kind: VisualKind::Figure,
        title: "Budget Breakdown".into(),
        caption: format!(
            "Figure 5: Budget breakdown showing total requested funding of ${}.",
            thousands(total)
        ),
        headers: vec!["Category".into(), "Amount".into(), "Share".into()],
        rows,
    }
}

/// 方法学对比表：提及论文数、平均被引、常用数据集
pub fn comparison_table(ctx: &ResearchContext) -> Option<Visual> {
    if ctx.methodologies.is_empty() {
        return None;
    }

    let rows: Vec<Vec<String>> = ctx
        .methodologies
        .iter()
        .take(5)
        .map(|method| {
            let needle = method.term.to_lowercase();
            let papers: Vec<_> = ctx
                .papers
                .iter()
                .filter(|p| p.searchable_text().to_lowercase().contains(&needle))
                .collect();

            let avg_citations = if papers.is_empty() {
                0.0
            } else {
                papers.iter().map(|p| p.citation_count as f64).sum::<f64>() / papers.len() as f64
            };

            let mut dataset_counts: HashMap<&str, usize> = HashMap::new();
            for paper in &papers {
                let text = paper.searchable_text();
                for dataset in &ctx.datasets {
                    if text.contains(dataset.term.as_str()) {
                        *dataset_counts.entry(dataset.term.as_str()).or_insert(0) += 1;
                    }
                }
            }
            let mut datasets: Vec<(&str, usize)> = dataset_counts.into_iter().collect();
            datasets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            let common = if datasets.is_empty() {
                "N/A".to_string()
            } else {
                datasets
                    .iter()
                    .take(3)
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            };

            vec![
                method.term.clone(),
                papers.len().to_string(),
                format!("{avg_citations:.1}"),
                common,
            ]
        })
        .collect();

    Some(Visual {
        id: "comparison".into(),
        kind: VisualKind::Table,
        title: "Methodology Comparison".into(),
        caption: format!(
            "Table 1: Comparison of {} research methodologies in the literature.",
            rows.len()
        ),
        headers: vec![
            "Methodology".into(),
            "Papers".into(),
            "Avg Citations".into(),
            "Common Datasets".into(),
        ],
        rows,
    })
}

fn short_title(title: &str) -> String {
    if title.chars().count() > 60 {
        format!("{}...", title.chars().take(57).collect::<String>())
    } else {
        title.to_string()
    }
}

/// 千分位格式化
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::paper::Paper;
    use crate::domain::models::research::{Bibliography, TermCount};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn context(papers: Vec<Paper>, methodologies: Vec<TermCount>, datasets: Vec<TermCount>) -> ResearchContext {
        let timeline = papers
            .iter()
            .filter_map(|p| p.year)
            .fold(BTreeMap::new(), |mut acc, y| {
                *acc.entry(y).or_insert(0) += 1;
                acc
            });
        ResearchContext {
            query: "q".into(),
            total_papers: papers.len(),
            collected_at: Utc::now(),
            papers,
            themes: vec![],
            methodologies,
            datasets,
            research_gaps: vec![],
            timeline,
            key_researchers: vec![],
            bibliography: Bibliography::default(),
            source_counts: BTreeMap::new(),
            news: vec![],
            custom_content: vec![],
        }
    }

    fn paper(title: &str, abstract_text: &str, year: i32, cites: u32) -> Paper {
        Paper {
            title: title.into(),
            abstract_text: abstract_text.into(),
            year: Some(year),
            citation_count: cites,
            ..Default::default()
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(350000), "350,000");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_default_plan_and_budget_captions() {
        assert_eq!(
            work_plan_gantt().caption,
            "Figure 4: Project timeline showing 6 major tasks over 21 months."
        );
        let budget = budget_breakdown();
        assert_eq!(
            budget.caption,
            "Figure 5: Budget breakdown showing total requested funding of $350,000."
        );
        assert_eq!(budget.rows.last().unwrap()[1], "$350,000");
    }

    #[test]
    fn test_empty_context_only_has_default_figures() {
        let visuals = generate_all(&context(vec![], vec![], vec![]));
        let ids: Vec<&str> = visuals.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["gantt", "budget"]);
    }

    #[test]
    fn test_full_visual_set() {
        let papers = vec![
            paper("Deep learning on ImageNet", "deep learning study", 2020, 100),
            paper("A survey", "survey of deep learning on COCO", 2022, 50),
        ];
        let ctx = context(
            papers,
            vec![
                TermCount { term: "deep learning".into(), count: 2 },
                TermCount { term: "survey".into(), count: 1 },
            ],
            vec![
                TermCount { term: "ImageNet".into(), count: 1 },
                TermCount { term: "COCO".into(), count: 1 },
            ],
        );

        let visuals = generate_all(&ctx);
        assert_eq!(visuals.figures.len(), 5);
        assert_eq!(visuals.tables.len(), 1);
        assert_eq!(
            visuals.figures[0].caption,
            "Figure 1: Research publication timeline showing 2 papers published between 2020 and 2022."
        );
        assert_eq!(visuals.figures[2].rows[0][2], "100");

        let table = &visuals.tables[0];
        assert_eq!(table.rows[0], vec!["deep learning", "2", "75.0", "COCO, ImageNet"]);
        assert_eq!(table.rows[1], vec!["survey", "1", "50.0", "COCO"]);
    }
}
