// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::ExportDocument;
use crate::domain::models::visuals::{Visual, VisualSet};
use crate::utils::text_processing::strip_markdown;

/// 渲染为 Markdown 表格
pub(crate) fn markdown_table(visual: &Visual) -> String {
    let escape = |cell: &str| cell.replace('|', "\\|");
    let mut lines = vec![
        format!(
            "| {} |",
            visual.headers.iter().map(|h| escape(h)).collect::<Vec<_>>().join(" | ")
        ),
        format!("|{}|", vec!["---"; visual.headers.len()].join("|")),
    ];
    for row in &visual.rows {
        lines.push(format!(
            "| {} |",
            row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
        ));
    }
    lines.join("\n")
}

fn visuals_markdown(visuals: &VisualSet) -> Vec<String> {
    let mut parts = vec!["## Figures and Tables".to_string(), String::new()];
    for visual in visuals.iter() {
        parts.push(format!("### {}", visual.title));
        parts.push(String::new());
        parts.push(markdown_table(visual));
        parts.push(String::new());
        parts.push(format!("*{}*", visual.caption));
        parts.push(String::new());
    }
    parts
}

/// 导出为 Markdown
pub fn render(doc: &ExportDocument) -> String {
    let mut parts = vec![
        format!("# {}", doc.title),
        String::new(),
        format!("**Proposal Type:** {}", doc.proposal_type),
        format!("**Keywords:** {}", doc.keywords),
        format!("**Date:** {}", doc.date),
        format!("**Word Count:** {}", doc.word_count),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for section in &doc.sections {
        parts.push(format!("## {}", section.name));
        parts.push(String::new());
        parts.push(section.content.trim().to_string());
        parts.push(String::new());
        parts.push("---".to_string());
        parts.push(String::new());
    }

    if !doc.visuals.is_empty() {
        parts.extend(visuals_markdown(&doc.visuals));
    }

    parts.push("## References".to_string());
    parts.push(String::new());
    for (idx, reference) in doc.references.iter().enumerate() {
        parts.push(format!("{}. {}", idx + 1, reference));
    }
    parts.push(String::new());

    parts.join("\n")
}

/// 导出为纯文本：去除 Markdown 与 HTML 标记
pub fn render_plain_text(doc: &ExportDocument) -> String {
    let mut parts = vec![
        doc.title.to_uppercase(),
        "=".repeat(80),
        format!("Proposal Type: {}", doc.proposal_type),
        format!("Keywords: {}", doc.keywords),
        format!("Date: {}", doc.date),
        format!("Word Count: {}", doc.word_count),
        String::new(),
    ];

    for section in &doc.sections {
        parts.push(section.name.to_uppercase());
        parts.push("-".repeat(80));
        parts.push(strip_markdown(section.content.trim()));
        parts.push(String::new());
    }

    for visual in doc.visuals.iter() {
        parts.push(visual.title.clone());
        parts.push(visual.headers.join("\t"));
        for row in &visual.rows {
            parts.push(row.join("\t"));
        }
        parts.push(visual.caption.clone());
        parts.push(String::new());
    }

    parts.push("REFERENCES".to_string());
    parts.push("-".repeat(80));
    for (idx, reference) in doc.references.iter().enumerate() {
        parts.push(format!("[{}] {}", idx + 1, reference));
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::test_support::sample_document;

    #[test]
    fn test_render_markdown() {
        let md = render(&sample_document());
        assert!(md.starts_with("# Soil Carbon & Climate\n\n**Proposal Type:** Horizon Europe"));
        assert!(md.contains("## Introduction\n\nSoils hold **more carbon**"));
        assert!(md.contains("| Category | Amount |\n|---|---|\n| Personnel | $1,000 |"));
        assert!(md.contains("*Figure 5: Budget breakdown.*"));
        assert!(md.contains("## References\n\n1. Smith, J. (2020)"));
    }

    #[test]
    fn test_render_plain_text_strips_markup() {
        let txt = render_plain_text(&sample_document());
        assert!(txt.contains("Soils hold more carbon than the atmosphere [1]."));
        assert!(!txt.contains("**"));
        assert!(!txt.contains("### Costs"));
        assert!(txt.contains("[1] Smith, J. (2020)"));
    }
}
