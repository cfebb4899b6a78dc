// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 最小化的 WordprocessingML 包：封面、目录域、标题、列表、图表与参考文献

use html_escape::encode_text;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ExportDocument, ExportError};
use crate::domain::models::visuals::Visual;

static INLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*").expect("Failed to compile inline markup regex")
});

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="360"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="1F4E79"/><w:sz w:val="32"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:color w:val="2E74B5"/><w:sz w:val="26"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:rPr><w:i/><w:sz w:val="18"/></w:rPr></w:style>
</w:styles>"#;

fn run(text: &str, bold: bool, italic: bool) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if italic {
        props.push_str("<w:i/>");
    }
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(
        r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        encode_text(text)
    )
}

/// 将 `**粗体**` 与 `*斜体*` 拆分为文本片段
fn inline_runs(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in INLINE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            out.push_str(&run(&text[last..whole.start()], false, false));
        }
        if let Some(bold) = caps.get(1) {
            out.push_str(&run(bold.as_str(), true, false));
        } else if let Some(italic) = caps.get(2) {
            out.push_str(&run(italic.as_str(), false, true));
        }
        last = whole.end();
    }
    if last < text.len() {
        out.push_str(&run(&text[last..], false, false));
    }
    out
}

fn paragraph(style: Option<&str>, runs: String) -> String {
    match style {
        Some(style) => format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{runs}</w:p>"#),
        None => format!("<w:p>{runs}</w:p>"),
    }
}

fn page_break() -> String {
    r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#.to_string()
}

fn markdown_paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(h) = line.strip_prefix("### ") {
                paragraph(Some("Heading3"), inline_runs(h))
            } else if let Some(h) = line.strip_prefix("## ") {
                paragraph(Some("Heading2"), inline_runs(h))
            } else if let Some(h) = line.strip_prefix("# ") {
                paragraph(Some("Heading2"), inline_runs(h))
            } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                paragraph(Some("ListBullet"), format!("{}{}", run("• ", false, false), inline_runs(item)))
            } else {
                paragraph(None, inline_runs(line))
            }
        })
        .collect()
}

fn table(visual: &Visual) -> String {
    let cell = |text: &str, bold: bool| {
        format!(
            r#"<w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/></w:tcPr><w:p>{}</w:p></w:tc>"#,
            run(text, bold, false)
        )
    };
    let mut out = String::from(
        r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders><w:top w:val="single" w:sz="4"/><w:left w:val="single" w:sz="4"/><w:bottom w:val="single" w:sz="4"/><w:right w:val="single" w:sz="4"/><w:insideH w:val="single" w:sz="4"/><w:insideV w:val="single" w:sz="4"/></w:tblBorders></w:tblPr>"#,
    );
    out.push_str("<w:tr>");
    for header in &visual.headers {
        out.push_str(&cell(header, true));
    }
    out.push_str("</w:tr>");
    for row in &visual.rows {
        out.push_str("<w:tr>");
        for value in row {
            out.push_str(&cell(value, false));
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
    out
}

fn document_xml(doc: &ExportDocument) -> String {
    let mut body = vec![
        paragraph(Some("Title"), run(&doc.title, false, false)),
        paragraph(None, String::new()),
        paragraph(None, run(&doc.proposal_type, true, false)),
    ];
    for (label, value) in [
        ("Date: ", doc.date.clone()),
        ("Keywords: ", doc.keywords.clone()),
        ("Word Count: ", doc.word_count.to_string()),
    ] {
        body.push(paragraph(
            None,
            format!("{}{}", run(label, true, false), run(&value, false, false)),
        ));
    }
    body.push(page_break());

    body.push(paragraph(Some("Heading1"), run("Table of Contents", false, false)));
    body.push(format!(
        r#"<w:p><w:fldSimple w:instr="TOC \o &quot;1-3&quot; \h \z \u">{}</w:fldSimple></w:p>"#,
        run("Right-click to update the table of contents.", false, true)
    ));
    body.push(page_break());

    for section in &doc.sections {
        body.push(paragraph(Some("Heading1"), run(&section.name, false, false)));
        body.extend(markdown_paragraphs(&section.content));
    }

    if !doc.visuals.is_empty() {
        body.push(paragraph(Some("Heading1"), run("Figures and Tables", false, false)));
        for visual in doc.visuals.iter() {
            body.push(paragraph(Some("Heading3"), run(&visual.title, false, false)));
            body.push(table(visual));
            body.push(paragraph(Some("Caption"), run(&visual.caption, false, false)));
        }
    }

    body.push(page_break());
    body.push(paragraph(Some("Heading1"), run("References", false, false)));
    for (idx, reference) in doc.references.iter().enumerate() {
        body.push(paragraph(None, run(&format!("[{}] {}", idx + 1, reference), false, false)));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr></w:body></w:document>"#,
        body.join("")
    )
}

/// 导出为 DOCX
pub fn render(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", STYLES.to_string()),
        ("word/document.xml", document_xml(doc)),
    ];
    for (name, content) in parts {
        writer.start_file(name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::test_support::sample_document;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_inline_runs() {
        let runs = inline_runs("plain **bold** and *it*");
        assert!(runs.contains(r#"<w:rPr><w:b/></w:rPr><w:t xml:space="preserve">bold</w:t>"#));
        assert!(runs.contains(r#"<w:rPr><w:i/></w:rPr><w:t xml:space="preserve">it</w:t>"#));
        assert!(runs.starts_with(r#"<w:r><w:t xml:space="preserve">plain </w:t></w:r>"#));
    }

    #[test]
    fn test_render_docx_package() {
        let bytes = render(&sample_document()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert!(archive.by_name("word/styles.xml").is_ok());

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("Soil Carbon &amp; Climate"));
        assert!(xml.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
        assert!(xml.contains("Personnel"));
        assert!(xml.contains("[1] Smith, J. (2020)"));
    }
}
