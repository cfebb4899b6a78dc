// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Failed to compile HTML tag regex"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));
static MD_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__|\*|_|`)").expect("Failed to compile emphasis regex"));
static MD_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s*").expect("Failed to compile heading regex"));
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Failed to compile paragraph regex"));
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("Failed to compile sentence regex"));
static REPEATED_VERBS: Lazy<[(Regex, &'static str); 3]> = Lazy::new(|| {
    [
        (r"(?i)\bshows?\s+that\s+shows?\b", "shows"),
        (r"(?i)\bdemonstrates?\s+that\s+demonstrates?\b", "demonstrates"),
        (r"(?i)\bhas\s+shown\s+shows\b", "has shown"),
    ]
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("Failed to compile repeated verb regex"),
            replacement,
        )
    })
});
static DANGLING_ENDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(?:are|is|for|to|the|and|in|of|with|at|by|from)\s*\.$")
        .expect("Failed to compile dangling ending regex")
});
static CITATION_CLUSTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9,\s]+)\]").expect("Failed to compile citation regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.,;:])").expect("Failed to compile punctuation regex"));
static BRACKET_INNER_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s+(\d)|(\d)\s+\]").expect("Failed to compile bracket spacing regex")
});

/// 句点不视为句末的缩写
const ABBREVIATIONS: &[&str] = &["al", "e.g", "i.e", "etc", "vs", "fig", "cf", "approx", "dr", "no"];
const MAX_SENTENCES_PER_PARAGRAPH: usize = 5;
const MIN_SENTENCE_WORDS: usize = 5;
const MAX_CLUSTER_CITATIONS: usize = 4;

/// 去除 HTML 标签
pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, " ").into_owned()
}

/// 统计单词数（先去除 HTML 标签，按空白切分）
pub fn count_words(text: &str) -> usize {
    strip_html_tags(text).split_whitespace().count()
}

/// 由单词数估算页数，每页 400 词，至少 1 页
pub fn estimate_pages(word_count: usize) -> usize {
    word_count.div_ceil(400).max(1)
}

/// 合并连续空白为单个空格
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// 按字符数截断，不拆分 UTF-8 字符
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// 去除 Markdown 标记，得到纯文本
pub fn strip_markdown(text: &str) -> String {
    let without_headings = MD_HEADING.replace_all(text, "");
    let without_emphasis = MD_EMPHASIS.replace_all(&without_headings, "");
    strip_html_tags(&without_emphasis)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 解码 HTML 实体并规范空白
pub fn clean_scraped_text(text: &str) -> String {
    normalize_whitespace(&html_escape::decode_html_entities(text))
}

/// 生成附件文件名：标题前 50 个字符，空格替换为下划线
pub fn export_filename(title: &str, extension: &str) -> String {
    let stem: String = truncate_chars(title, 50)
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '"' | '\\' | '/' | '\r' | '\n' => '_',
            other => other,
        })
        .collect();
    format!("{}_Proposal.{}", stem, extension)
}

/// 清理模型生成的章节正文
///
/// 逐段处理普通段落：去除紧邻重复的单词与动词短语、重复三元组所在的句子、
/// 以虚词结尾的残句和过短的句子片段，每 5 句分段，引用簇最多保留 4 个编号。
/// 标题、列表、表格与引用块原样保留
pub fn clean_generated_text(text: &str) -> String {
    let mut seen_trigrams = HashSet::new();

    PARAGRAPH_BREAK
        .split(text.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|paragraph| {
            if is_structured_block(paragraph) {
                paragraph.to_string()
            } else {
                clean_paragraph(paragraph, &mut seen_trigrams)
            }
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn is_structured_block(paragraph: &str) -> bool {
    let first = paragraph.trim_start();
    first.starts_with(['#', '-', '*', '|', '>', '+'])
        || first
            .split_once(". ")
            .is_some_and(|(marker, _)| !marker.is_empty() && marker.chars().all(|c| c.is_ascii_digit()))
}

fn clean_paragraph(paragraph: &str, seen_trigrams: &mut HashSet<String>) -> String {
    let mut text = remove_repeated_words(&normalize_whitespace(paragraph));
    for (pattern, replacement) in REPEATED_VERBS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let candidates: Vec<String> = split_sentences(&text)
        .into_iter()
        .filter(|sentence| !repeats_trigram(sentence, seen_trigrams))
        .map(|sentence| DANGLING_ENDING.replace(&sentence, ".").into_owned())
        .collect();

    // A lone short sentence is the paragraph itself, not a fragment
    let sentences: Vec<String> = if candidates.len() > 1 {
        candidates
            .into_iter()
            .filter(|s| s.split_whitespace().count() >= MIN_SENTENCE_WORDS)
            .collect()
    } else {
        candidates
    };

    let joined = sentences
        .chunks(MAX_SENTENCES_PER_PARAGRAPH)
        .map(|chunk| chunk.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n");

    fix_spacing(&limit_citation_clusters(&joined))
}

fn remove_repeated_words(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let bare = token.trim_end_matches(|c: char| !c.is_alphanumeric());
        if let Some(prev) = out.last_mut() {
            let prev_is_word = prev.chars().all(|c| c.is_alphanumeric() || c == '_');
            if prev_is_word && !bare.is_empty() && bare.eq_ignore_ascii_case(prev) {
                // Keep the first occurrence and the trailing punctuation of the second
                prev.push_str(&token[bare.len()..]);
                continue;
            }
        }
        out.push(token.to_string());
    }
    out.join(" ")
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let candidate = &text[start..m.start() + 1];
        let last_word = candidate
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .trim_start_matches('(')
            .trim_end_matches('.')
            .to_lowercase();
        if last_word.chars().count() == 1 || ABBREVIATIONS.contains(&last_word.as_str()) {
            continue;
        }
        sentences.push(candidate.trim().to_string());
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn repeats_trigram(sentence: &str, seen: &mut HashSet<String>) -> bool {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    for window in words.windows(3) {
        let trigram = window.join(" ").to_lowercase();
        if trigram.len() > 20 && seen.contains(&trigram) {
            return true;
        }
        seen.insert(trigram);
    }
    false
}

fn limit_citation_clusters(text: &str) -> String {
    CITATION_CLUSTER
        .replace_all(text, |caps: &Captures| {
            let numbers: Vec<&str> = caps[1].split(',').collect();
            if numbers.len() > MAX_CLUSTER_CITATIONS {
                format!("[{}]", numbers[..MAX_CLUSTER_CITATIONS].join(","))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn fix_spacing(text: &str) -> String {
    let text = SPACE_BEFORE_PUNCT.replace_all(text, "$1");
    BRACKET_INNER_SPACE
        .replace_all(&text, |caps: &Captures| match (caps.get(1), caps.get(2)) {
            (Some(digit), _) => format!("[{}", digit.as_str()),
            (_, Some(digit)) => format!("{}]", digit.as_str()),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words_strips_tags() {
        assert_eq!(count_words("<p>Deep <b>learning</b> for</p> climate"), 4);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_estimate_pages() {
        assert_eq!(estimate_pages(0), 1);
        assert_eq!(estimate_pages(400), 1);
        assert_eq!(estimate_pages(401), 2);
        assert_eq!(estimate_pages(1200), 3);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("Skłodowska", 3), "Skł");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("## Aims\n**Bold** and *it*"), "Aims\nBold and it");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Quantum Sensing for Bridges", "docx"),
            "Quantum_Sensing_for_Bridges_Proposal.docx"
        );
        let long = "a".repeat(80);
        assert_eq!(export_filename(&long, "md").len(), 50 + "_Proposal.md".len());
    }

    #[test]
    fn test_clean_generated_text_removes_repetition() {
        let text = "The the results show that shows strong recovery in treated plots [1]. \
                    Drought stress reduced microbial biomass across all sites [2]. \
                    Drought stress reduced microbial biomass across all sites again [3].";

        let cleaned = clean_generated_text(text);

        assert_eq!(
            cleaned,
            "The results shows strong recovery in treated plots [1]. \
             Drought stress reduced microbial biomass across all sites [2]."
        );
    }

    #[test]
    fn test_clean_generated_text_fixes_fragments_and_clusters() {
        let text = "Too short. Prior work (e.g. Smith et al. 2020) studied nitrogen cycling in the [1, 2, 3, 4, 5, 6]. \
                    We extend that work to semi-arid grasslands of the.";

        let cleaned = clean_generated_text(text);

        assert_eq!(
            cleaned,
            "Prior work (e.g. Smith et al. 2020) studied nitrogen cycling in the [1, 2, 3, 4]. \
             We extend that work to semi-arid grasslands of."
        );
    }

    #[test]
    fn test_clean_generated_text_keeps_structure() {
        let text = "### Aims\n\n- first aim\n- second aim\n\nShort lone sentence";
        assert_eq!(clean_generated_text(text), text);

        let long = (1..=6)
            .map(|i| format!("Plot {i} received {i}0 mm of rain."))
            .collect::<Vec<_>>()
            .join(" ");
        let cleaned = clean_generated_text(&long);
        assert_eq!(cleaned.matches("\n\n").count(), 1);
        assert!(cleaned.ends_with("rain.\n\nPlot 6 received 60 mm of rain."));
    }
}
