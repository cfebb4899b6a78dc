// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use html_escape::encode_text;
use pulldown_cmark::{html::push_html, Options, Parser};

use super::ExportDocument;
use crate::domain::models::visuals::Visual;

const STYLES: &str = r#"<style>
body { font-family: Georgia, serif; max-width: 860px; margin: 2em auto; line-height: 1.6; color: #222; }
.cover-page { text-align: center; margin-bottom: 3em; }
.metadata { color: #555; }
.section { margin-bottom: 2em; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
figcaption { font-style: italic; color: #555; }
.references li { margin-bottom: 0.5em; }
</style>"#;

/// Markdown 片段转 HTML
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::new();
    push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

fn visual_html(visual: &Visual) -> String {
    let mut out = String::from("<figure>\n<table>\n<thead><tr>");
    for header in &visual.headers {
        out.push_str(&format!("<th>{}</th>", encode_text(header)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &visual.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", encode_text(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str(&format!(
        "</tbody>\n</table>\n<figcaption>{}</figcaption>\n</figure>",
        encode_text(&visual.caption)
    ));
    out
}

/// 导出为独立 HTML 文档
pub fn render(doc: &ExportDocument) -> String {
    let title = encode_text(&doc.title);
    let mut parts = vec![
        "<!DOCTYPE html>".to_string(),
        r#"<html lang="en">"#.to_string(),
        "<head>".to_string(),
        r#"<meta charset="UTF-8">"#.to_string(),
        format!("<title>{title}</title>"),
        STYLES.to_string(),
        "</head>".to_string(),
        "<body>".to_string(),
        r#"<div class="cover-page">"#.to_string(),
        format!("<h1>{title}</h1>"),
        format!("<h2>{}</h2>", encode_text(&doc.proposal_type)),
        format!(
            r#"<p class="metadata">Keywords: {}</p>"#,
            encode_text(&doc.keywords)
        ),
        format!(
            r#"<p class="metadata">Date: {} | Words: {}</p>"#,
            encode_text(&doc.date),
            doc.word_count
        ),
        "</div>".to_string(),
    ];

    for section in &doc.sections {
        parts.push(r#"<div class="section">"#.to_string());
        parts.push(format!("<h2>{}</h2>", encode_text(&section.name)));
        parts.push(markdown_to_html(&section.content));
        parts.push("</div>".to_string());
    }

    if !doc.visuals.is_empty() {
        parts.push(r#"<div class="section">"#.to_string());
        parts.push("<h2>Figures and Tables</h2>".to_string());
        for visual in doc.visuals.iter() {
            parts.push(format!("<h3>{}</h3>", encode_text(&visual.title)));
            parts.push(visual_html(visual));
        }
        parts.push("</div>".to_string());
    }

    parts.push(r#"<div class="section">"#.to_string());
    parts.push("<h2>References</h2>".to_string());
    parts.push(r#"<ol class="references">"#.to_string());
    for reference in &doc.references {
        parts.push(format!("<li>{}</li>", encode_text(reference)));
    }
    parts.push("</ol>".to_string());
    parts.push("</div>".to_string());
    parts.push("</body>".to_string());
    parts.push("</html>".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::test_support::sample_document;

    #[test]
    fn test_render_html() {
        let html = render(&sample_document());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Soil Carbon &amp; Climate</title>"));
        assert!(html.contains("<strong>more carbon</strong>"));
        assert!(html.contains("<li>First aim</li>"));
        assert!(html.contains("<td>Personnel</td>"));
        assert!(html.contains("<figcaption>Figure 5: Budget breakdown.</figcaption>"));
        assert!(html.contains(r#"<ol class="references">"#));
    }
}
