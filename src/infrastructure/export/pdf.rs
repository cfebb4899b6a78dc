// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use super::{ExportDocument, ExportError};
use crate::utils::text_encoding::to_ascii;
use crate::utils::text_processing::strip_markdown;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
// Average Helvetica glyph width relative to the font size
const AVG_CHAR_WIDTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.35;

const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 15.0;
const SUBHEADING_SIZE: f32 = 12.5;
const TITLE_SIZE: f32 = 22.0;

/// 排版后的一行
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PdfLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    /// 行前额外留白（毫米）
    pub space_before: f32,
    /// 在新页开始
    pub page_break: bool,
}

impl PdfLine {
    fn height(&self) -> f32 {
        self.space_before + self.size * PT_TO_MM * LINE_SPACING
    }
}

/// 按近似字宽折行
pub(crate) fn wrap_text(text: &str, size: f32) -> Vec<String> {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / PT_TO_MM;
    let max_chars = ((usable_pt / (size * AVG_CHAR_WIDTH)) as usize).max(10);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Layout {
    lines: Vec<PdfLine>,
}

impl Layout {
    fn push(&mut self, text: &str, size: f32, bold: bool, space_before: f32) {
        for (idx, line) in wrap_text(&to_ascii(text), size).into_iter().enumerate() {
            self.lines.push(PdfLine {
                text: line,
                size,
                bold,
                space_before: if idx == 0 { space_before } else { 0.0 },
                page_break: false,
            });
        }
    }

    fn break_page(&mut self) {
        self.lines.push(PdfLine {
            text: String::new(),
            size: BODY_SIZE,
            bold: false,
            space_before: 0.0,
            page_break: true,
        });
    }
}

/// 将文档排为行序列
pub(crate) fn layout(doc: &ExportDocument) -> Vec<PdfLine> {
    let mut layout = Layout { lines: Vec::new() };

    // Title page
    layout.push(&doc.title, TITLE_SIZE, true, 60.0);
    layout.push(&doc.proposal_type, SUBHEADING_SIZE, true, 10.0);
    layout.push(&format!("Keywords: {}", doc.keywords), BODY_SIZE, false, 10.0);
    layout.push(&format!("Date: {}", doc.date), BODY_SIZE, false, 2.0);
    layout.push(&format!("Word Count: {}", doc.word_count), BODY_SIZE, false, 2.0);

    for section in &doc.sections {
        layout.break_page();
        layout.push(&section.name, HEADING_SIZE, true, 0.0);
        for raw in section.content.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                layout.push(&strip_markdown(line), SUBHEADING_SIZE, true, 4.0);
            } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                layout.push(&format!("- {}", strip_markdown(item)), BODY_SIZE, false, 1.0);
            } else {
                layout.push(&strip_markdown(line), BODY_SIZE, false, 2.5);
            }
        }
    }

    if !doc.visuals.is_empty() {
        layout.break_page();
        layout.push("Figures and Tables", HEADING_SIZE, true, 0.0);
        for visual in doc.visuals.iter() {
            layout.push(&visual.title, SUBHEADING_SIZE, true, 5.0);
            layout.push(&visual.headers.join(" | "), BODY_SIZE, true, 1.0);
            for row in &visual.rows {
                layout.push(&row.join(" | "), BODY_SIZE, false, 0.5);
            }
            layout.push(&visual.caption, BODY_SIZE - 1.5, false, 1.5);
        }
    }

    layout.break_page();
    layout.push("References", HEADING_SIZE, true, 0.0);
    for (idx, reference) in doc.references.iter().enumerate() {
        layout.push(&format!("[{}] {}", idx + 1, reference), BODY_SIZE - 1.0, false, 2.0);
    }

    layout.lines
}

/// 按页高分页，显式分页行另起一页
pub(crate) fn paginate(lines: Vec<PdfLine>) -> Vec<Vec<PdfLine>> {
    let usable = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;
    let mut pages: Vec<Vec<PdfLine>> = vec![Vec::new()];
    let mut used = 0.0;

    for line in lines {
        if line.page_break {
            if pages.last().is_some_and(|p| !p.is_empty()) {
                pages.push(Vec::new());
                used = 0.0;
            }
            continue;
        }
        let height = line.height();
        if used + height > usable && pages.last().is_some_and(|p| !p.is_empty()) {
            pages.push(Vec::new());
            used = 0.0;
        }
        used += height;
        if let Some(page) = pages.last_mut() {
            page.push(line);
        }
    }

    pages.retain(|p| !p.is_empty());
    pages
}

/// 导出为 A4 PDF（内置 Helvetica 字体）
pub fn render(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let pdf_title = to_ascii(&doc.title);
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&pdf_title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular: IndirectFontRef = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold: IndirectFontRef = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (idx, page_lines) in paginate(layout(doc)).into_iter().enumerate() {
        let layer = if idx == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = pdf.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            pdf.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in page_lines {
            y -= line.height();
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(line.text, line.size, Mm(MARGIN_MM), Mm(y), font);
        }
    }

    pdf.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::test_support::sample_document;
    use crate::infrastructure::export::ExportSection;

    #[test]
    fn test_wrap_text() {
        let text = "word ".repeat(100);
        let lines = wrap_text(&text, BODY_SIZE);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 88));
        assert_eq!(lines.join(" ").split_whitespace().count(), 100);
    }

    #[test]
    fn test_layout_starts_sections_on_new_pages() {
        let pages = paginate(layout(&sample_document()));
        // title page, two sections, visuals, references
        assert_eq!(pages.len(), 5);
        assert_eq!(pages[1][0].text, "Introduction");
        assert!(pages[1].iter().any(|l| l.text == "- Second aim with emphasis"));
    }

    #[test]
    fn test_long_section_spills_over() {
        let mut doc = sample_document();
        doc.sections = vec![ExportSection {
            name: "Methodology".to_string(),
            content: "A long methodological paragraph. ".repeat(40).repeat(10).replace(". A", ".\nA"),
        }];
        let pages = paginate(layout(&doc));
        assert!(pages.len() > 4);
    }

    #[test]
    fn test_render_pdf_bytes() {
        let bytes = render(&sample_document()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
