// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use uuid::Uuid;

use crate::domain::models::paper::Paper;
use crate::domain::models::proposal_type::ProposalTemplate;
use crate::domain::models::research::ResearchContext;
use crate::domain::services::citation_service;
use crate::utils::text_processing::truncate_chars;

/// 章节名称关键词到检索偏好词
const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("Introduction", &["background", "context", "motivation", "problem"]),
    ("Background", &["history", "evolution", "previous", "existing"]),
    ("Literature Review", &["review", "survey", "comparative", "analysis"]),
    ("Methodology", &["method", "approach", "technique", "algorithm", "framework"]),
    ("Innovation", &["novel", "new", "innovative", "breakthrough", "advanced"]),
    ("Impact", &["impact", "benefit", "application", "deployment", "real-world"]),
    ("Work Plan", &["plan", "timeline", "schedule", "milestone", "deliverable"]),
];

/// 未选择提案类型时使用的章节计划：(名称, 最少词数, 最多词数, 说明)
const DEFAULT_SECTIONS: &[(&str, i32, i32, &str)] = &[
    ("Introduction and Background", 500, 1200, "Context, motivation and the problem addressed"),
    ("Literature Review", 600, 1500, "Critical synthesis of the state of the art"),
    ("Theoretical Framework", 400, 1000, "Concepts and models underpinning the work"),
    ("Research Questions and Hypotheses", 300, 800, "Questions and testable hypotheses"),
    ("Research Objectives", 300, 800, "Specific, measurable objectives"),
    ("Methodology and Approach", 600, 1500, "Methods, data, tools and validation"),
    ("Work Plan and Timeline", 400, 1000, "Work packages, milestones and deliverables"),
    ("Expected Outcomes and Impact", 400, 1000, "Scientific, societal and economic impact"),
    ("Risk Assessment and Mitigation", 300, 800, "Key risks and mitigation measures"),
    ("Budget Justification", 300, 800, "Justification of requested resources"),
    ("Broader Impacts", 300, 800, "Benefits beyond the immediate research field"),
    ("Data Management Plan", 300, 800, "Data collection, storage, sharing and ethics"),
];

pub const EDITOR_SYSTEM_PROMPT: &str = "You are an expert proposal editor.";

/// 默认章节计划
pub fn default_section_plan() -> Vec<ProposalTemplate> {
    DEFAULT_SECTIONS
        .iter()
        .enumerate()
        .map(|(idx, (name, min_words, max_words, description))| ProposalTemplate {
            id: Uuid::nil(),
            proposal_type_id: Uuid::nil(),
            section_name: name.to_string(),
            section_order: idx as i32 + 1,
            is_required: true,
            min_words: *min_words,
            max_words: *max_words,
            description: description.to_string(),
            prompt_template: format!(
                "Write a rigorous {name} section. Focus on: {}.",
                description.to_lowercase()
            ),
        })
        .collect()
}

/// 研究上下文的 Markdown 摘要
pub fn research_context_markdown(ctx: &ResearchContext) -> String {
    let mut parts: Vec<String> = vec![
        "# Research Context".to_string(),
        format!("Total Papers Analyzed: {}", ctx.total_papers),
        String::new(),
    ];

    if !ctx.themes.is_empty() {
        parts.push("## Major Research Themes:".to_string());
        for theme in ctx.themes.iter().take(10) {
            parts.push(format!("- {}: {} papers", theme.name, theme.citation_keys.len()));
        }
        parts.push(String::new());
    }

    if !ctx.methodologies.is_empty() {
        parts.push("## Common Methodologies:".to_string());
        for method in ctx.methodologies.iter().take(15) {
            parts.push(format!("- {}", method.term));
        }
        parts.push(String::new());
    }

    if !ctx.datasets.is_empty() {
        parts.push("## Frequently Used Datasets:".to_string());
        for dataset in ctx.datasets.iter().take(10) {
            parts.push(format!("- {}", dataset.term));
        }
        parts.push(String::new());
    }

    if !ctx.timeline.is_empty() {
        parts.push("## Publication Timeline:".to_string());
        let skip = ctx.timeline.len().saturating_sub(10);
        for (year, count) in ctx.timeline.iter().skip(skip) {
            parts.push(format!("- {year}: {count} papers"));
        }
        parts.push(String::new());
    }

    if !ctx.key_researchers.is_empty() {
        parts.push("## Key Researchers:".to_string());
        for researcher in ctx.key_researchers.iter().take(10) {
            parts.push(format!(
                "- {}: {} papers, {} citations",
                researcher.name, researcher.paper_count, researcher.total_citations
            ));
        }
        parts.push(String::new());
    }

    if !ctx.research_gaps.is_empty() {
        parts.push("## Identified Research Gaps:".to_string());
        for gap in ctx.research_gaps.iter().take(5) {
            parts.push(format!("- {gap}"));
        }
        parts.push(String::new());
    }

    parts.join("\n")
}

/// 为章节挑选论文
///
/// 章节名匹配关键词表时，每命中一个关键词加 2 分后重新排序；
/// 否则直接取相关性最高的前 `max_papers` 篇
pub fn select_relevant_papers<'a>(
    section_name: &str,
    papers: &'a [Paper],
    max_papers: usize,
) -> Vec<&'a Paper> {
    let section_lower = section_name.to_lowercase();
    let keywords: Vec<&str> = SECTION_KEYWORDS
        .iter()
        .filter(|(key, _)| section_lower.contains(&key.to_lowercase()))
        .flat_map(|(_, words)| words.iter().copied())
        .collect();

    if keywords.is_empty() {
        return papers.iter().take(max_papers).collect();
    }

    let mut scored: Vec<(f64, &Paper)> = papers
        .iter()
        .map(|paper| {
            let text = paper.searchable_text().to_lowercase();
            let matches = keywords.iter().filter(|kw| text.contains(*kw)).count();
            (paper.relevance_score + matches as f64 * 2.0, paper)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(max_papers).map(|(_, p)| p).collect()
}

/// 章节生成的系统提示词
pub fn section_system_prompt(proposal_type_name: &str, template: &ProposalTemplate) -> String {
    format!(
        r#"You are an expert grant proposal writer specializing in {proposal_type_name} proposals.

Your task is to write the "{section}" section of a grant proposal.

CRITICAL CITATION REQUIREMENTS:
1. You MUST use ONLY the papers provided in the research data
2. NEVER fabricate or hallucinate citations
3. Every factual claim MUST be supported by a citation from the provided papers
4. Use in-text citations in APA format: (Author, Year) or Author (Year)
5. Use the exact citation keys provided in the paper data
6. When citing multiple sources, use: (Author1, Year1; Author2, Year2)

SECTION REQUIREMENTS:
- Word count: {min} - {max} words
- Required: {required}
- Description: {description}

WRITING STYLE:
- Academic and professional
- Clear and concise
- Evidence-based with proper citations
- Use active voice where appropriate
- Maintain logical flow

FORMATTING:
- Use markdown formatting
- Use headings and subheadings where appropriate
- Use bullet points and numbered lists for clarity

Every statement should add value to the proposal."#,
        section = template.section_name,
        min = template.min_words,
        max = template.max_words,
        required = template.is_required,
        description = template.description,
    )
}

/// 提案概要
pub struct ProposalBrief<'a> {
    pub title: &'a str,
    pub keywords: &'a str,
    pub description: &'a str,
}

/// 章节生成的用户提示词
pub fn section_user_prompt(
    brief: &ProposalBrief<'_>,
    template: &ProposalTemplate,
    research_context: &str,
    papers: &[&Paper],
) -> String {
    let mut parts: Vec<String> = vec![
        "# Proposal Overview".to_string(),
        format!("**Title:** {}", brief.title),
        format!("**Keywords:** {}", brief.keywords),
        format!("**Description:** {}", brief.description),
        String::new(),
        research_context.to_string(),
        String::new(),
        "# Relevant Research Papers".to_string(),
        "Use ONLY these papers for citations:".to_string(),
        String::new(),
    ];

    for (i, paper) in papers.iter().enumerate() {
        let authors: Vec<&str> = paper.authors.iter().take(5).map(String::as_str).collect();
        parts.push(format!("## Paper {}: {}", i + 1, paper.citation_key));
        parts.push(format!("**Title:** {}", paper.title));
        parts.push(format!("**Authors:** {}", authors.join(", ")));
        parts.push(format!("**Year:** {}", paper.year_label()));
        parts.push(format!(
            "**Abstract:** {}...",
            truncate_chars(&paper.abstract_text, 500)
        ));
        parts.push(format!("**Citation:** {}", citation_service::format_apa(paper)));
        parts.push(format!("**Citation Key:** `{}`", paper.citation_key));
        parts.push(String::new());
    }

    parts.push("# Your Task".to_string());
    parts.push(format!(
        "Write the **{}** section following this guidance:",
        template.section_name
    ));
    parts.push(template.prompt_template.clone());
    parts.push(String::new());
    parts.push("# Final Instructions:".to_string());
    parts.push("1. Write ONLY the section content, do not include a title".to_string());
    parts.push("2. Cite papers using their citation keys".to_string());
    parts.push("3. Ensure all claims are supported by the provided papers".to_string());
    parts.push("4. Meet the word count requirements".to_string());
    parts.push("5. Use professional academic language".to_string());
    parts.push(String::new());
    parts.push("Begin writing now:".to_string());

    parts.join("\n")
}

/// 章节润色的系统提示词
pub const ENHANCER_SYSTEM_PROMPT: &str = "You are an expert grant proposal writer. \
You specialize in comprehensive, detailed proposals that meet the highest academic standards. \
You NEVER hallucinate citations: you only use citation numbers that are explicitly provided to you. \
You write in clear, formal academic English.";

/// 章节润色的用户提示词
pub fn enhancement_prompt(
    section_title: &str,
    section_content: &str,
    available_citations: &[u32],
    context: &str,
) -> String {
    let citations: Vec<String> = available_citations.iter().map(u32::to_string).collect();
    format!(
        r#"SECTION: {section_title}

CURRENT CONTENT:
{section_content}

AVAILABLE CITATIONS (you MUST use these exact numbers when citing):
{citations}

RULES:
1. Use specific quantitative targets where the content allows
2. Reference the relevant citations to support every major claim
3. Integrate findings from previous sections: {context}
4. Be concrete: include actual methods, tools, timelines and deliverables

OUTPUT FORMAT:
Provide ONLY the enhanced section content without the section title or commentary.
All citations must use the exact format [1], [2, 3] with ONLY numbers from the available list."#,
        citations = citations.join(", "),
    )
}

/// AI 编辑的用户提示词
pub fn edit_prompt(instruction: &str, text: &str) -> String {
    format!(
        "Edit the following text based on this instruction: {instruction}\n\nOriginal text:\n{text}\n\nProvide the edited version:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::research::{Bibliography, TermCount, Theme};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn paper(title: &str, abstract_text: &str, score: f64) -> Paper {
        Paper {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            relevance_score: score,
            citation_key: title.replace(' ', ""),
            ..Default::default()
        }
    }

    fn context() -> ResearchContext {
        ResearchContext {
            query: "q".into(),
            total_papers: 2,
            collected_at: Utc::now(),
            papers: vec![],
            themes: vec![Theme { name: "Ecology".into(), citation_keys: vec!["a".into(), "b".into()] }],
            methodologies: vec![TermCount { term: "survey".into(), count: 2 }],
            datasets: vec![],
            research_gaps: vec!["little is known".into()],
            timeline: (2000..2015).map(|y| (y, 1)).collect::<BTreeMap<_, _>>(),
            key_researchers: vec![],
            bibliography: Bibliography::default(),
            source_counts: BTreeMap::new(),
            news: vec![],
            custom_content: vec![],
        }
    }

    #[test]
    fn test_context_markdown_sections() {
        let md = research_context_markdown(&context());
        assert!(md.starts_with("# Research Context\nTotal Papers Analyzed: 2"));
        assert!(md.contains("- Ecology: 2 papers"));
        assert!(md.contains("## Common Methodologies:\n- survey"));
        assert!(!md.contains("## Frequently Used Datasets"));
        // only the last ten years of the timeline
        assert!(!md.contains("- 2004: 1 papers"));
        assert!(md.contains("- 2005: 1 papers"));
        assert!(md.contains("- little is known"));
    }

    #[test]
    fn test_select_papers_boosts_section_keywords() {
        let papers = vec![
            paper("Generic result", "", 5.0),
            paper("A novel method", "new technique and algorithm", 2.0),
        ];

        let picked = select_relevant_papers("Methodology and Approach", &papers, 1);
        assert_eq!(picked[0].title, "A novel method");

        let unmatched = select_relevant_papers("Budget Justification", &papers, 1);
        assert_eq!(unmatched[0].title, "Generic result");
    }

    #[test]
    fn test_default_plan_is_ordered() {
        let plan = default_section_plan();
        assert_eq!(plan.len(), 12);
        assert_eq!(plan[0].section_order, 1);
        assert_eq!(plan[11].section_name, "Data Management Plan");
    }

    #[test]
    fn test_user_prompt_lists_papers_and_task() {
        let papers = vec![paper("Alpha study", "Abstract text", 1.0)];
        let refs: Vec<&Paper> = papers.iter().collect();
        let template = &default_section_plan()[1];
        let brief = ProposalBrief { title: "T", keywords: "k", description: "d" };

        let prompt = section_user_prompt(&brief, template, "# Research Context", &refs);
        assert!(prompt.contains("## Paper 1: Alphastudy"));
        assert!(prompt.contains("Write the **Literature Review** section"));
        assert!(prompt.ends_with("Begin writing now:"));
    }

    #[test]
    fn test_edit_prompt_format() {
        assert_eq!(
            edit_prompt("shorten", "Long text"),
            "Edit the following text based on this instruction: shorten\n\nOriginal text:\nLong text\n\nProvide the edited version:"
        );
    }
}
