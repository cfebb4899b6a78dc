// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::research::{Bibliography, ResearchOptions};
use crate::domain::services::proposal_generator::GeneratedSection;

/// 快速生成请求
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuickGenerateDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub description: String,
}

/// 完整生成请求
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ComprehensiveGenerateDto {
    pub proposal_type_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub description: String,
    /// 每行一个网址
    #[serde(default)]
    pub custom_urls: String,
    pub include_news: Option<bool>,
}

impl ComprehensiveGenerateDto {
    pub fn custom_url_list(&self) -> Vec<String> {
        self.custom_urls
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EnhanceRequestDto {
    #[serde(default)]
    pub proposal_content: String,
}

/// 仅检索、不生成
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ResearchSearchDto {
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
    #[serde(default)]
    pub include_news: bool,
    #[serde(default = "default_include_web")]
    pub include_web: bool,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub custom_urls: Vec<String>,
}

fn default_include_web() -> bool {
    true
}

impl From<&ResearchSearchDto> for ResearchOptions {
    fn from(dto: &ResearchSearchDto) -> Self {
        Self {
            include_news: dto.include_news,
            include_web: dto.include_web,
            custom_urls: dto.custom_urls.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionMetadata {
    pub title: String,
    pub sections: Vec<GeneratedSection>,
    pub word_count: i32,
    pub citation_count: i32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct VisualCounts {
    pub count: usize,
    pub figures: usize,
    pub tables: usize,
}

/// 完整生成过程推送的事件，按 `type` 字段区分
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    Phase {
        phase: String,
        message: String,
    },
    RagComplete {
        total_papers: usize,
        total_news: usize,
        sources: BTreeMap<String, usize>,
        message: String,
    },
    VisualsComplete {
        total_visuals: usize,
        message: String,
    },
    Info {
        message: String,
        total_sections: usize,
    },
    SectionStart {
        section_name: String,
        section_number: usize,
        total_sections: usize,
    },
    SectionComplete {
        section_name: String,
        content: String,
        word_count: usize,
    },
    SectionError {
        section_name: String,
        error: String,
    },
    Complete {
        proposal_id: Uuid,
        full_proposal: String,
        metadata: CompletionMetadata,
        bibliography: Bibliography,
        visuals: VisualCounts,
        message: String,
        execution_time: f64,
    },
    Error {
        message: String,
    },
}

impl GenerationEvent {
    pub fn phase(phase: &str, message: impl Into<String>) -> Self {
        GenerationEvent::Phase {
            phase: phase.to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        GenerationEvent::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationEvent::Complete { .. } | GenerationEvent::Error { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_url_list_skips_blank_lines() {
        let dto = ComprehensiveGenerateDto {
            custom_urls: "https://a.example\n\n  https://b.example  \n".into(),
            ..Default::default()
        };
        assert_eq!(
            dto.custom_url_list(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_event_serialization_uses_type_tag() {
        let json = serde_json::to_value(GenerationEvent::SectionStart {
            section_name: "Methodology".into(),
            section_number: 2,
            total_sections: 5,
        })
        .unwrap();
        assert_eq!(json["type"], "section_start");
        assert_eq!(json["section_number"], 2);

        let json = serde_json::to_value(GenerationEvent::phase("rag", "Searching")).unwrap();
        assert_eq!(json["type"], "phase");
        assert_eq!(json["phase"], "rag");
    }

    #[test]
    fn test_research_search_defaults() {
        let dto: ResearchSearchDto = serde_json::from_str(r#"{"query": "soil"}"#).unwrap();
        let options = ResearchOptions::from(&dto);
        assert!(!options.include_news);
        assert!(options.include_web);
    }
}
