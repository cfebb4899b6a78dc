// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::proposal_type::ProposalTemplate;
use crate::domain::models::research::ResearchContext;
use crate::domain::services::llm_service::{ChatRequest, LlmClient, LlmError};
use crate::domain::services::prompt_builder::{self, ProposalBrief};
use crate::utils::text_processing::{clean_generated_text, count_words};

/// 生成完成的章节
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedSection {
    pub name: String,
    pub content: String,
    pub word_count: usize,
}

impl GeneratedSection {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            word_count: count_words(&content),
            content,
        }
    }
}

/// 提案生成器
///
/// 按章节模板逐节调用 LLM，提示词包含研究上下文与该章节最相关的论文
pub struct ProposalGenerator {
    llm: Arc<dyn LlmClient>,
    papers_per_section: usize,
}

impl ProposalGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, papers_per_section: usize) -> Self {
        Self {
            llm,
            papers_per_section,
        }
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// 生成单个章节
    ///
    /// `context_markdown` 由调用方预先生成，所有章节共用
    pub async fn generate_section(
        &self,
        proposal_type_name: &str,
        brief: &ProposalBrief<'_>,
        template: &ProposalTemplate,
        research: &ResearchContext,
        context_markdown: &str,
    ) -> Result<GeneratedSection, LlmError> {
        let papers = prompt_builder::select_relevant_papers(
            &template.section_name,
            &research.papers,
            self.papers_per_section,
        );
        debug!(
            "Generating section '{}' with {} papers",
            template.section_name,
            papers.len()
        );

        let request = ChatRequest::new(
            prompt_builder::section_system_prompt(proposal_type_name, template),
            prompt_builder::section_user_prompt(brief, template, context_markdown, &papers),
        )
        .with_temperature(0.7);

        let completion = self.llm.complete(request).await?;
        Ok(GeneratedSection::new(
            template.section_name.clone(),
            clean_generated_text(&completion.content),
        ))
    }

    /// 按指令改写章节文本，不保存
    pub async fn edit_text(&self, instruction: &str, text: &str) -> Result<String, LlmError> {
        let request = ChatRequest::new(
            prompt_builder::EDITOR_SYSTEM_PROMPT,
            prompt_builder::edit_prompt(instruction, text),
        )
        .with_temperature(0.7)
        .with_max_tokens(2000);

        Ok(self.llm.complete(request).await?.content)
    }
}

/// 把章节汇编为完整的 Markdown 提案
pub fn compile_proposal(
    brief: &ProposalBrief<'_>,
    proposal_type_name: &str,
    sections: &[GeneratedSection],
) -> String {
    let mut parts: Vec<String> = vec![
        format!("# {}", brief.title),
        String::new(),
        format!("**Proposal Type:** {proposal_type_name}"),
        format!("**Keywords:** {}", brief.keywords),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Executive Summary".to_string(),
        String::new(),
        brief.description.to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for section in sections {
        parts.push(format!("## {}", section.name));
        parts.push(String::new());
        parts.push(section.content.clone());
        parts.push(String::new());
        parts.push("---".to_string());
        parts.push(String::new());
    }

    parts.join("\n")
}
