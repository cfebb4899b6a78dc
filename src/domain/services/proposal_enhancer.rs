// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::services::citation_service;
use crate::domain::services::llm_service::{ChatRequest, LlmClient};
use crate::domain::services::prompt_builder;

static SECTION_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Executive Summary|REFERENCES|\d+\.\s+.+)$")
        .expect("Failed to compile section heading regex")
});

static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:Title:\s*|#\s+)(.+)$").expect("Failed to compile title regex"));

static KEYWORDS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:\*\*)?Keywords:(?:\*\*)?\s*(.+)$").expect("Failed to compile keywords regex")
});

const RULE_WIDTH: usize = 80;
const CONTEXT_BUFFER_CHARS: usize = 3000;
const CONTEXT_SNIPPET_CHARS: usize = 500;

/// 流式文本接口推送的事件，序列化为 `{"type": ..., "content": ...}`
///
/// 快速生成与润色共用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum StreamEvent {
    Status(String),
    Content(String),
    Warning(String),
    Error(String),
    Complete(String),
}

/// 提案润色器
///
/// 逐章节改写提案，只允许使用原文已出现的数字引用，结尾保留原 REFERENCES 块
pub struct ProposalEnhancer {
    llm: Arc<dyn LlmClient>,
}

impl ProposalEnhancer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 润色全文并把事件发送到 `events`
    ///
    /// 接收端关闭时提前结束
    pub async fn enhance(&self, original: &str, events: mpsc::Sender<StreamEvent>) {
        let emit = |event: StreamEvent| {
            let events = events.clone();
            async move { events.send(event).await.is_ok() }
        };

        if !emit(StreamEvent::Status(
            "Analyzing original proposal and extracting citations...".into(),
        ))
        .await
        {
            return;
        }

        let citations = citation_service::extract_numeric_citations(original);
        let allowed = citations.used_citations.clone();
        emit(StreamEvent::Status(format!(
            "Found {} citations. Preserving all references...",
            allowed.len()
        )))
        .await;

        let sections = split_into_sections(original);
        emit(StreamEvent::Status(format!(
            "Identified {} sections for enhancement...",
            sections.len()
        )))
        .await;

        let rule = "=".repeat(RULE_WIDTH);
        emit(StreamEvent::Content(format!("ENHANCED GRANT PROPOSAL\n{rule}\n\n"))).await;
        if let Some(title) = TITLE_REGEX.captures(original) {
            emit(StreamEvent::Content(format!("Title: {}\n", title[1].trim()))).await;
        }
        if let Some(keywords) = KEYWORDS_REGEX.captures(original) {
            emit(StreamEvent::Content(format!("Keywords: {}\n\n", keywords[1].trim()))).await;
        }

        let total = sections.len();
        let mut context_buffer = String::new();
        for (idx, (title, content)) in sections.iter().enumerate() {
            if title == "REFERENCES" {
                continue;
            }

            emit(StreamEvent::Status(format!(
                "Enhancing section {}/{}: {}",
                idx + 1,
                total,
                title
            )))
            .await;
            if !emit(StreamEvent::Content(format!("\n{title}\n{rule}\n\n"))).await {
                return;
            }

            let request = ChatRequest::new(
                prompt_builder::ENHANCER_SYSTEM_PROMPT,
                prompt_builder::enhancement_prompt(title, content, &allowed, &context_buffer),
            );
            let mut enhanced = match self.llm.complete(request).await {
                Ok(completion) => completion.content,
                Err(e) => {
                    warn!("Enhancement of section '{}' failed: {}", title, e);
                    emit(StreamEvent::Warning(format!(
                        "Enhancement error in {title}: {e}. Original content kept."
                    )))
                    .await;
                    content.trim().to_string()
                }
            };

            let invalid = citation_service::invalid_citations(&enhanced, &allowed);
            if !invalid.is_empty() {
                emit(StreamEvent::Warning(format!(
                    "Warning: Removed invalid citations {invalid:?} from {title}"
                )))
                .await;
                enhanced = citation_service::strip_citations(&enhanced, &invalid);
            }

            emit(StreamEvent::Content(enhanced.clone())).await;
            emit(StreamEvent::Content("\n".into())).await;

            let snippet: String = enhanced.chars().take(CONTEXT_SNIPPET_CHARS).collect();
            context_buffer = last_chars(
                &format!("{context_buffer}\n{title}: {snippet}"),
                CONTEXT_BUFFER_CHARS,
            );
        }

        emit(StreamEvent::Status("Adding validated references section...".into())).await;
        emit(StreamEvent::Content(format!("\nREFERENCES\n{rule}\n\n"))).await;
        emit(StreamEvent::Content(citations.references_section)).await;
        emit(StreamEvent::Complete(
            "Enhancement complete! All original citations preserved.".into(),
        ))
        .await;
    }
}

/// 按章节标题切分提案
///
/// 识别 `Executive Summary`、`REFERENCES` 与 `1. Introduction` 形式的编号标题，
/// Markdown 标题前缀 `#` 会被忽略；第一个标题之前的内容被丢弃
pub fn split_into_sections(text: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let heading = trimmed.trim_start_matches('#').trim();
        let is_markdown_section = trimmed.starts_with("## ") && !trimmed.starts_with("###");

        if SECTION_HEADING_REGEX.is_match(heading) || is_markdown_section {
            if let Some(title) = current.take() {
                sections.push((title, body.join("\n")));
            }
            current = Some(heading.to_string());
            body.clear();
        } else {
            body.push(line);
        }
    }

    if let Some(title) = current {
        sections.push((title, body.join("\n")));
    }

    sections
}

fn last_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::llm_service::{ChatCompletion, LlmError};
    use async_trait::async_trait;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatCompletion, LlmError> {
            Ok(ChatCompletion {
                content: self.0.to_string(),
                ..Default::default()
            })
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn sample() -> String {
        format!(
            "Title: Soil carbon\nKeywords: soil, carbon\n\nExecutive Summary\nWe study soil [1].\n\n1. Introduction\nCarbon matters [2].\n\nREFERENCES\n{}\n[1] Ref one\n[2] Ref two\n",
            "=".repeat(80)
        )
    }

    #[test]
    fn test_split_into_sections() {
        let sections = split_into_sections(&sample());
        let titles: Vec<&str> = sections.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, vec!["Executive Summary", "1. Introduction", "REFERENCES"]);
        assert!(sections[1].1.contains("Carbon matters [2]."));
    }

    #[test]
    fn test_split_markdown_headings() {
        let text = "# Title\n\n## Executive Summary\nA\n## Methodology\nB\n### Detail\nC";
        let sections = split_into_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].0, "Methodology");
        assert!(sections[1].1.contains("### Detail"));
    }

    #[tokio::test]
    async fn test_enhance_strips_invalid_citations_and_keeps_references() {
        let enhancer = ProposalEnhancer::new(Arc::new(FixedLlm("Improved text [1] and [9].")));
        let (tx, mut rx) = mpsc::channel(64);

        enhancer.enhance(&sample(), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        let warnings: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Warning(_)))
            .collect();
        assert_eq!(warnings.len(), 2);

        let body: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Content(c) => Some(c.as_str()),
                _ => None,
            })
            .collect();
        assert!(body.starts_with("ENHANCED GRANT PROPOSAL"));
        assert!(body.contains("Title: Soil carbon"));
        assert!(body.contains("Improved text [1] and ."));
        assert!(!body.contains("[9]"));
        assert!(body.contains("[2] Ref two"));
        assert!(matches!(events.last(), Some(StreamEvent::Complete(_))));
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(StreamEvent::Status("x".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "status", "content": "x"}));
    }
}
