// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ExportDocument;
use crate::domain::models::visuals::Visual;

static BOLD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("Failed to compile bold regex"));
static ITALIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("Failed to compile italic regex"));

const PREAMBLE: &[&str] = &[
    r"\documentclass[11pt,a4paper]{article}",
    r"\usepackage[utf8]{inputenc}",
    r"\usepackage{geometry}",
    r"\usepackage{times}",
    r"\usepackage{hyperref}",
    r"\usepackage{graphicx}",
    r"\usepackage{cite}",
    r"\geometry{margin=1in}",
    r"\setlength{\parindent}{0pt}",
    r"\setlength{\parskip}{1em}",
];

/// 转义 LaTeX 特殊字符
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\^{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            other => out.push(other),
        }
    }
    out
}

fn inline_markup(text: &str) -> String {
    let escaped = escape_latex(text);
    let bold = BOLD_REGEX.replace_all(&escaped, r"\textbf{$1}");
    ITALIC_REGEX.replace_all(&bold, r"\textit{$1}").into_owned()
}

/// Markdown 转 LaTeX：标题、粗体、斜体与无序列表
pub fn markdown_to_latex(content: &str) -> String {
    let mut out = Vec::new();
    let mut in_list = false;

    for line in content.lines() {
        let trimmed = line.trim();
        let bullet = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "));

        if bullet.is_none() && in_list {
            out.push(r"\end{itemize}".to_string());
            in_list = false;
        }

        if let Some(item) = bullet {
            if !in_list {
                out.push(r"\begin{itemize}".to_string());
                in_list = true;
            }
            out.push(format!(r"\item {}", inline_markup(item)));
        } else if let Some(heading) = trimmed.strip_prefix("### ") {
            out.push(format!(r"\subsubsection{{{}}}", inline_markup(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            out.push(format!(r"\subsection{{{}}}", inline_markup(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            out.push(format!(r"\section{{{}}}", inline_markup(heading)));
        } else {
            out.push(inline_markup(line));
        }
    }
    if in_list {
        out.push(r"\end{itemize}".to_string());
    }

    out.join("\n")
}

fn visual_latex(visual: &Visual) -> Vec<String> {
    let columns = "l".repeat(visual.headers.len().max(1));
    let row = |cells: &[String]| {
        format!(
            r"{} \\",
            cells.iter().map(|c| escape_latex(c)).collect::<Vec<_>>().join(" & ")
        )
    };

    let mut lines = vec![
        r"\begin{table}[h]".to_string(),
        r"\centering".to_string(),
        format!(r"\begin{{tabular}}{{{columns}}}"),
        r"\hline".to_string(),
        row(&visual.headers),
        r"\hline".to_string(),
    ];
    lines.extend(visual.rows.iter().map(|r| row(r)));
    lines.push(r"\hline".to_string());
    lines.push(r"\end{tabular}".to_string());
    lines.push(format!(r"\caption{{{}}}", escape_latex(&visual.caption)));
    lines.push(r"\end{table}".to_string());
    lines
}

/// 导出为 LaTeX 源文件
pub fn render(doc: &ExportDocument) -> String {
    let mut parts: Vec<String> = PREAMBLE.iter().map(|l| l.to_string()).collect();
    parts.push(String::new());
    parts.push(format!(r"\title{{{}}}", escape_latex(&doc.title)));
    parts.push(format!(
        r"\author{{{} \\ \small Keywords: {}}}",
        escape_latex(&doc.proposal_type),
        escape_latex(&doc.keywords)
    ));
    parts.push(format!(r"\date{{{}}}", escape_latex(&doc.date)));
    parts.push(String::new());
    parts.push(r"\begin{document}".to_string());
    parts.push(r"\maketitle".to_string());
    parts.push(r"\tableofcontents".to_string());
    parts.push(r"\newpage".to_string());
    parts.push(String::new());

    for section in &doc.sections {
        parts.push(format!(r"\section{{{}}}", escape_latex(&section.name)));
        parts.push(String::new());
        parts.push(markdown_to_latex(&section.content));
        parts.push(String::new());
    }

    if !doc.visuals.is_empty() {
        parts.push(r"\section{Figures and Tables}".to_string());
        for visual in doc.visuals.iter() {
            parts.extend(visual_latex(visual));
        }
        parts.push(String::new());
    }

    parts.push(r"\newpage".to_string());
    parts.push(r"\section*{References}".to_string());
    parts.push(r"\begin{enumerate}".to_string());
    for reference in &doc.references {
        parts.push(format!(r"\item {}", escape_latex(reference)));
    }
    parts.push(r"\end{enumerate}".to_string());
    parts.push(r"\end{document}".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::test_support::sample_document;

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex(r"50% & $5 #1 a_b {x} ~ ^ \"), r"50\% \& \$5 \#1 a\_b \{x\} \textasciitilde{} \^{} \textbackslash{}");
    }

    #[test]
    fn test_markdown_to_latex() {
        let latex = markdown_to_latex("## Aims\n**Bold** and *it*\n- one\n- two\nAfter");
        assert_eq!(
            latex,
            "\\subsection{Aims}\n\\textbf{Bold} and \\textit{it}\n\\begin{itemize}\n\\item one\n\\item two\n\\end{itemize}\nAfter"
        );
    }

    #[test]
    fn test_render_latex_document() {
        let tex = render(&sample_document());
        assert!(tex.starts_with(r"\documentclass[11pt,a4paper]{article}"));
        assert!(tex.contains(r"\title{Soil Carbon \& Climate}"));
        assert!(tex.contains(r"\tableofcontents"));
        assert!(tex.contains(r"\section{Budget\_Plan}"));
        assert!(tex.contains(r"We request 100\% of costs."));
        assert!(tex.contains(r"\begin{enumerate}"));
        assert!(tex.trim_end().ends_with(r"\end{document}"));
    }
}
