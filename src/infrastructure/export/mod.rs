// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 提案导出
//!
//! 将保存的提案渲染为 DOCX、PDF、LaTeX、Markdown、HTML、纯文本或 JSON

pub mod docx;
pub mod html;
pub mod latex;
pub mod markdown;
pub mod pdf;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::models::proposal::{ProposalSection, SavedProposal};
use crate::domain::models::visuals::VisualSet;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format")]
    UnsupportedFormat(String),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
    Latex,
    Markdown,
    Html,
    Txt,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Latex => "latex",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Latex => "tex",
            ExportFormat::Markdown => "md",
            other => other.as_str(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Latex => "application/x-tex",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            "latex" => Ok(ExportFormat::Latex),
            "markdown" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "txt" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 导出用章节
#[derive(Debug, Clone, Serialize)]
pub struct ExportSection {
    pub name: String,
    pub content: String,
}

/// 与格式无关的导出文档
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub title: String,
    pub proposal_type: String,
    pub keywords: String,
    /// 形如 `March 01, 2025`
    pub date: String,
    pub word_count: i32,
    pub sections: Vec<ExportSection>,
    pub visuals: VisualSet,
    /// APA 格式参考文献
    pub references: Vec<String>,
    /// JSON 导出使用的完整记录
    pub record: serde_json::Value,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    proposal: &'a SavedProposal,
    proposal_type: &'a str,
    sections: &'a [ProposalSection],
}

impl ExportDocument {
    /// 由提案及其章节构建；没有章节时整篇正文作为单一章节
    pub fn from_proposal(
        proposal: &SavedProposal,
        sections: &[ProposalSection],
        proposal_type: Option<&str>,
    ) -> Self {
        let proposal_type = proposal_type.unwrap_or("Custom Proposal").to_string();

        let export_sections = if sections.is_empty() {
            vec![ExportSection {
                name: "Proposal".to_string(),
                content: proposal.content.clone(),
            }]
        } else {
            let mut ordered: Vec<&ProposalSection> = sections.iter().collect();
            ordered.sort_by_key(|s| s.section_order);
            ordered
                .into_iter()
                .map(|s| ExportSection {
                    name: s.section_name.clone(),
                    content: s.content.clone(),
                })
                .collect()
        };

        let visuals = proposal
            .content_json
            .get("visuals")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let references = proposal
            .citations_data
            .get("apa")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let record = serde_json::to_value(JsonRecord {
            proposal,
            proposal_type: &proposal_type,
            sections,
        })
        .unwrap_or(serde_json::Value::Null);

        Self {
            title: proposal.title.clone(),
            keywords: proposal.keywords.clone(),
            date: proposal.updated_at.format("%B %d, %Y").to_string(),
            word_count: proposal.word_count,
            proposal_type,
            sections: export_sections,
            visuals,
            references,
            record,
        }
    }
}

/// 按格式渲染文档
pub fn export(doc: &ExportDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Docx => docx::render(doc),
        ExportFormat::Pdf => pdf::render(doc),
        ExportFormat::Latex => Ok(latex::render(doc).into_bytes()),
        ExportFormat::Markdown => Ok(markdown::render(doc).into_bytes()),
        ExportFormat::Html => Ok(html::render(doc).into_bytes()),
        ExportFormat::Txt => Ok(markdown::render_plain_text(doc).into_bytes()),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(&doc.record)?),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::models::visuals::{Visual, VisualKind};

    pub fn sample_document() -> ExportDocument {
        ExportDocument {
            title: "Soil Carbon & Climate".to_string(),
            proposal_type: "Horizon Europe".to_string(),
            keywords: "soil, carbon".to_string(),
            date: "March 01, 2025".to_string(),
            word_count: 42,
            sections: vec![
                ExportSection {
                    name: "Introduction".to_string(),
                    content: "Soils hold **more carbon** than the atmosphere [1].\n\n- First aim\n- Second aim with *emphasis*".to_string(),
                },
                ExportSection {
                    name: "Budget_Plan".to_string(),
                    content: "### Costs\nWe request 100% of costs.".to_string(),
                },
            ],
            visuals: VisualSet {
                figures: vec![Visual {
                    id: "budget".to_string(),
                    kind: VisualKind::Figure,
                    title: "Budget Breakdown".to_string(),
                    caption: "Figure 5: Budget breakdown.".to_string(),
                    headers: vec!["Category".to_string(), "Amount".to_string()],
                    rows: vec![vec!["Personnel".to_string(), "$1,000".to_string()]],
                }],
                tables: Vec::new(),
            },
            references: vec!["Smith, J. (2020). Soil carbon. https://doi.org/10.1/x".to_string()],
            record: serde_json::json!({"title": "Soil Carbon & Climate"}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::Latex.extension(), "tex");
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert!(matches!(
            "rtf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_json_export_uses_record() {
        let doc = test_support::sample_document();
        let bytes = export(&doc, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["title"], "Soil Carbon & Climate");
    }
}
