// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::settings::WebSettings;
use crate::domain::models::funding_call::{
    CallRequirements, DynamicStructure, FundingCall, TemplateLink, TemplateStructure,
};
use crate::domain::search::source::SourceError;
use crate::infrastructure::web::{build_client, fetch_html};
use crate::utils::text_processing::clean_scraped_text;

/// 资助机构登记信息
#[derive(Debug, Clone, Copy)]
pub struct FundingSource {
    pub key: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub search_patterns: &'static [&'static str],
}

pub const FUNDING_SOURCES: &[FundingSource] = &[
    FundingSource {
        key: "horizon_europe",
        name: "Horizon Europe",
        url: "https://ec.europa.eu/info/funding-tenders/opportunities/portal/screen/home",
        search_patterns: &["horizon europe", "H2020", "FP9"],
    },
    FundingSource {
        key: "nsf",
        name: "National Science Foundation",
        url: "https://www.nsf.gov/funding/",
        search_patterns: &["NSF grant", "NSF funding"],
    },
    FundingSource {
        key: "nih",
        name: "National Institutes of Health",
        url: "https://grants.nih.gov/",
        search_patterns: &["NIH grant", "R01", "R21"],
    },
    FundingSource {
        key: "erc",
        name: "European Research Council",
        url: "https://erc.europa.eu/apply-grant",
        search_patterns: &["ERC grant", "starting grant", "advanced grant"],
    },
    FundingSource {
        key: "wellcome",
        name: "Wellcome Trust",
        url: "https://wellcome.org/grant-funding",
        search_patterns: &["Wellcome grant", "Wellcome funding"],
    },
    FundingSource {
        key: "gates",
        name: "Gates Foundation",
        url: "https://www.gatesfoundation.org/about/how-we-work/general-information/grant-opportunities",
        search_patterns: &["Gates Foundation grant"],
    },
];

/// 按键名（不区分大小写）查找资助机构
pub fn funding_source(key: &str) -> Option<&'static FundingSource> {
    let key = key.trim().to_lowercase();
    FUNDING_SOURCES.iter().find(|s| s.key == key)
}

const MAX_QUERIES: usize = 3;
const MAX_CALLS: usize = 20;
const MAX_TEMPLATE_RESULTS_PER_QUERY: usize = 5;
const MAX_RECOMMENDED_SECTIONS: usize = 15;
const CALL_KEYWORDS: &[&str] = &["grant", "funding", "call", "rfp", "proposal"];
const TEMPLATE_KEYWORDS: &[&str] = &["template", "example", "sample", "guide"];
const SECTION_KEYWORDS: &[&str] = &[
    "executive summary",
    "abstract",
    "introduction",
    "background",
    "literature review",
    "methodology",
    "work plan",
    "budget",
    "impact",
    "innovation",
    "objectives",
    "deliverables",
    "timeline",
];

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".g").expect("Failed to compile result selector"));
static H3_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3").expect("Failed to compile h3 selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile anchor selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".VwiC3b").expect("Failed to compile snippet selector"));
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("Failed to compile h1 selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3").expect("Failed to compile heading selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile paragraph selector"));

fn case_insensitive(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .expect("Failed to compile requirement regex")
        })
        .collect()
}

static DEADLINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    case_insensitive(&[
        r"deadline[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        r"due[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        r"submission[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
    ])
});
static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\$\s*([\d,]+(?:\.\d{2})?)\s*(?:million|M)?",
        r"€\s*([\d,]+(?:\.\d{2})?)\s*(?:million|M)?",
        r"up to\s*\$?([\d,]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Failed to compile amount regex"))
    .collect()
});
static PAGE_LIMIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    case_insensitive(&[
        r"(\d+)\s*page\s*limit",
        r"maximum\s*of\s*(\d+)\s*pages",
        r"not\s*exceed\s*(\d+)\s*pages",
    ])
});

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] SourceError),
}

/// 网页搜索结果条目
#[derive(Debug, Clone, PartialEq)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// 资助机会发现服务
///
/// 向配置的搜索端点发起查询并解析结果页；相邻查询之间保持最小间隔
pub struct FundingDiscovery {
    client: reqwest::Client,
    search_url: String,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl FundingDiscovery {
    pub fn new(settings: &WebSettings) -> Self {
        Self {
            client: build_client(settings),
            search_url: settings.search_url.clone(),
            limiter: Quota::with_period(Duration::from_secs(2)).map(RateLimiter::direct),
        }
    }

    /// 设置相邻搜索请求的最小间隔，`Duration::ZERO` 表示不限速
    pub fn with_query_interval(mut self, interval: Duration) -> Self {
        self.limiter = Quota::with_period(interval).map(RateLimiter::direct);
        self
    }

    /// 查找公开的资助申请
    ///
    /// 查询来自资助机构的搜索模式与研究领域，最多 3 条；按 URL 去重，最多 20 条
    pub async fn discover_open_calls(
        &self,
        funding_body: Option<&str>,
        research_area: Option<&str>,
    ) -> Vec<FundingCall> {
        let source = funding_body.and_then(funding_source);
        let mut queries: Vec<String> = source
            .map(|s| s.search_patterns.iter().map(|p| p.to_string()).collect())
            .unwrap_or_default();
        if let Some(area) = research_area.map(str::trim).filter(|a| !a.is_empty()) {
            queries.push(format!("{area} grant funding 2024 2025"));
        }
        if queries.is_empty() {
            queries.push("research grant funding open calls 2024".to_string());
        }

        let body_name = source
            .map(|s| s.name.to_string())
            .or_else(|| funding_body.map(str::to_string))
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut calls = Vec::new();
        for query in queries.iter().take(MAX_QUERIES) {
            for hit in self.search(query).await {
                if !is_funding_call(&hit) || !seen.insert(hit.url.clone()) {
                    continue;
                }
                calls.push(FundingCall {
                    title: hit.title,
                    url: hit.url,
                    description: hit.snippet,
                    funding_body: body_name.clone(),
                    source: "Web Search".to_string(),
                });
            }
        }

        calls.truncate(MAX_CALLS);
        info!("Discovered {} open funding calls", calls.len());
        calls
    }

    /// 从申请页面提取要求
    pub async fn extract_call_requirements(
        &self,
        url: &str,
    ) -> Result<CallRequirements, DiscoveryError> {
        Url::parse(url).map_err(|_| DiscoveryError::InvalidUrl(url.to_string()))?;
        let html = fetch_html(&self.client, "call_page", url, &[]).await?;
        Ok(parse_call_requirements(&html, url))
    }

    /// 搜索资助机构的申请模板
    pub async fn search_templates(
        &self,
        funding_body: &str,
        proposal_type: Option<&str>,
    ) -> Vec<TemplateLink> {
        let body_name = funding_source(funding_body)
            .map(|s| s.name)
            .unwrap_or(funding_body);

        let mut queries = vec![
            format!("{body_name} proposal template"),
            format!("{body_name} grant application template"),
            format!("{body_name} successful proposal example"),
        ];
        if let Some(kind) = proposal_type {
            queries.push(format!("{body_name} {kind} template"));
        }

        let mut templates = Vec::new();
        for query in queries.iter().take(MAX_QUERIES) {
            let query = format!("{query} filetype:pdf OR filetype:doc");
            for hit in self
                .search(&query)
                .await
                .into_iter()
                .take(MAX_TEMPLATE_RESULTS_PER_QUERY)
            {
                let title = hit.title.to_lowercase();
                if TEMPLATE_KEYWORDS.iter().any(|k| title.contains(k)) {
                    templates.push(TemplateLink {
                        format: detect_file_format(&hit.url).to_string(),
                        title: hit.title,
                        url: hit.url,
                        funding_body: body_name.to_string(),
                    });
                }
            }
        }
        templates
    }

    /// 分析模板页面的标题结构；PDF 与 Word 文档不抓取
    pub async fn analyze_template_structure(
        &self,
        url: &str,
    ) -> Result<TemplateStructure, DiscoveryError> {
        Url::parse(url).map_err(|_| DiscoveryError::InvalidUrl(url.to_string()))?;
        if url.contains(".pdf") || url.contains(".doc") {
            return Ok(TemplateStructure {
                url: url.to_string(),
                sections: Vec::new(),
            });
        }

        let html = fetch_html(&self.client, "template_page", url, &[]).await?;
        Ok(TemplateStructure {
            url: url.to_string(),
            sections: parse_template_sections(&html),
        })
    }

    /// 综合申请、要求与模板，生成推荐的提案结构
    pub async fn create_dynamic_structure(
        &self,
        funding_body: &str,
        research_area: &str,
    ) -> DynamicStructure {
        let calls = self
            .discover_open_calls(Some(funding_body), Some(research_area))
            .await;

        let requirements = match calls.first() {
            Some(call) => match self.extract_call_requirements(&call.url).await {
                Ok(req) => Some(req),
                Err(e) => {
                    warn!("Failed to extract requirements from {}: {}", call.url, e);
                    None
                }
            },
            None => None,
        };

        let templates = self.search_templates(funding_body, None).await;
        let analyses = join_all(
            templates
                .iter()
                .take(3)
                .map(|t| self.analyze_template_structure(&t.url)),
        )
        .await;
        let template_structures: Vec<TemplateStructure> = analyses
            .into_iter()
            .filter_map(|result| match result {
                Ok(structure) => Some(structure),
                Err(e) => {
                    warn!("Template analysis failed: {}", e);
                    None
                }
            })
            .filter(|s| !s.sections.is_empty())
            .collect();

        let recommended_sections =
            merge_section_recommendations(requirements.as_ref(), &template_structures);

        DynamicStructure {
            funding_body: funding_body.to_string(),
            research_area: research_area.to_string(),
            open_calls: calls.into_iter().take(5).collect(),
            requirements,
            templates,
            template_structures,
            recommended_sections,
        }
    }

    async fn search(&self, query: &str) -> Vec<SearchHit> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        match fetch_html(&self.client, "web_search", &self.search_url, &[("q", query)]).await {
            Ok(html) => parse_search_results(&html, &self.search_url),
            Err(e) => {
                warn!("Web search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

fn is_funding_call(hit: &SearchHit) -> bool {
    let title = hit.title.to_lowercase();
    let snippet = hit.snippet.to_lowercase();
    CALL_KEYWORDS
        .iter()
        .any(|k| title.contains(k) || snippet.contains(k))
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_scraped_text(&element.text().collect::<String>())
}

/// 解析搜索结果页（`.g` 块中的 `h3`、首个链接与 `.VwiC3b` 摘要）
fn parse_search_results(html: &str, search_url: &str) -> Vec<SearchHit> {
    let base = Url::parse(search_url).ok();
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result| {
            let href = result
                .select(&ANCHOR_SELECTOR)
                .next()?
                .value()
                .attr("href")?;
            Some(SearchHit {
                title: result
                    .select(&H3_SELECTOR)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
                url: resolve_result_url(base.as_ref(), href),
                snippet: result
                    .select(&SNIPPET_SELECTOR)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// 还原 `/url?q=<target>` 形式的跳转链接
fn resolve_result_url(base: Option<&Url>, href: &str) -> String {
    let Some(resolved) = base.and_then(|b| b.join(href).ok()) else {
        return href.to_string();
    };
    if resolved.path() == "/url" {
        if let Some((_, target)) = resolved.query_pairs().find(|(k, _)| k == "q") {
            return target.into_owned();
        }
    }
    String::from(resolved)
}

fn detect_file_format(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if url.contains(".pdf") {
        "pdf"
    } else if url.contains(".doc") {
        "docx"
    } else if url.contains(".txt") {
        "txt"
    } else {
        "webpage"
    }
}

fn title_case(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 从申请页面 HTML 中提取要求
pub fn parse_call_requirements(html: &str, url: &str) -> CallRequirements {
    let document = Html::parse_document(html);
    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    let lowered = text.to_lowercase();

    let deadline = DEADLINE_PATTERNS
        .iter()
        .find_map(|re| re.captures(&text).map(|c| c[1].to_string()));
    let funding_amount = AMOUNT_PATTERNS
        .iter()
        .find_map(|re| re.find(&text).map(|m| m.as_str().trim().to_string()));
    let page_limit = PAGE_LIMIT_PATTERNS
        .iter()
        .find_map(|re| re.captures(&text).and_then(|c| c[1].parse().ok()));

    let required_sections = SECTION_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .map(|k| title_case(k))
        .collect();

    let eligibility = document
        .select(&PARAGRAPH_SELECTOR)
        .map(element_text)
        .filter(|p| p.to_lowercase().contains("eligib"))
        .collect();

    CallRequirements {
        url: url.to_string(),
        title: document
            .select(&H1_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        deadline,
        funding_amount,
        page_limit,
        required_sections,
        eligibility,
    }
}

/// h1-h3 标题中长度在 4 到 99 个字符之间的部分，保持顺序去重
pub fn parse_template_sections(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    document
        .select(&HEADING_SELECTOR)
        .map(element_text)
        .filter(|h| (4..100).contains(&h.chars().count()))
        .filter(|h| seen.insert(h.clone()))
        .collect()
}

/// 合并推荐章节
///
/// 先取申请要求中的章节，再按出现次数降序加入在至少两个模板中出现的标题；
/// 不区分大小写去重，最多 15 个
pub fn merge_section_recommendations(
    requirements: Option<&CallRequirements>,
    structures: &[TemplateStructure],
) -> Vec<String> {
    let mut sections: Vec<String> = requirements
        .map(|r| r.required_sections.clone())
        .unwrap_or_default();

    let mut order: Vec<&String> = Vec::new();
    let mut frequency: HashMap<&String, usize> = HashMap::new();
    for section in structures.iter().flat_map(|s| s.sections.iter()) {
        let count = frequency.entry(section).or_insert(0);
        if *count == 0 {
            order.push(section);
        }
        *count += 1;
    }
    order.sort_by(|a, b| frequency[b].cmp(&frequency[a]));

    for section in order {
        if frequency[section] >= 2 && !sections.contains(section) {
            sections.push(section.clone());
        }
    }

    let mut seen = HashSet::new();
    sections
        .into_iter()
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_RECOMMENDED_SECTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_source_lookup() {
        assert_eq!(funding_source("NSF").map(|s| s.name), Some("National Science Foundation"));
        assert!(funding_source("unknown").is_none());
        assert_eq!(FUNDING_SOURCES.len(), 6);
    }

    #[test]
    fn test_parse_search_results() {
        let html = r#"
            <div class="g"><a href="/url?q=https://nsf.gov/call-1&sa=U"><h3>NSF Open Call</h3></a>
                <div class="VwiC3b">Apply for funding</div></div>
            <div class="g"><a href="https://example.org/blog"><h3>A blog</h3></a></div>
            <div class="g"><h3>No link</h3></div>"#;

        let hits = parse_search_results(html, "https://www.google.com/search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://nsf.gov/call-1");
        assert_eq!(hits[0].snippet, "Apply for funding");
        assert!(is_funding_call(&hits[0]));
        assert!(!is_funding_call(&hits[1]));
    }

    #[test]
    fn test_parse_call_requirements() {
        let html = r#"<html><body>
            <h1>Climate Resilience Call</h1>
            <p>Deadline: 15/03/2025. Awards of up to $500,000 are available.</p>
            <p>Proposals must not exceed 15 pages and include a Methodology and Budget.</p>
            <p>Eligibility: universities and research institutes.</p>
        </body></html>"#;

        let req = parse_call_requirements(html, "https://funder.org/call");
        assert_eq!(req.title, "Climate Resilience Call");
        assert_eq!(req.deadline.as_deref(), Some("15/03/2025"));
        assert_eq!(req.funding_amount.as_deref(), Some("$500,000"));
        assert_eq!(req.page_limit, Some(15));
        assert!(req.required_sections.contains(&"Methodology".to_string()));
        assert!(req.required_sections.contains(&"Budget".to_string()));
        assert_eq!(req.eligibility.len(), 1);
    }

    #[test]
    fn test_parse_template_sections() {
        let html = "<h1>Project Summary</h1><h2>Aim</h2><h2>Project Summary</h2>\
                    <h3>Broader Impacts</h3><h4>Ignored heading</h4>";
        assert_eq!(
            parse_template_sections(html),
            vec!["Project Summary", "Broader Impacts"]
        );
    }

    #[test]
    fn test_merge_section_recommendations() {
        let requirements = CallRequirements {
            required_sections: vec!["Budget".to_string(), "Impact".to_string()],
            ..Default::default()
        };
        let structure = |sections: &[&str]| TemplateStructure {
            url: String::new(),
            sections: sections.iter().map(|s| s.to_string()).collect(),
        };
        let structures = vec![
            structure(&["Work Packages", "budget", "Ethics"]),
            structure(&["Work Packages", "budget"]),
            structure(&["Ethics", "Risks"]),
        ];

        let merged = merge_section_recommendations(Some(&requirements), &structures);
        assert_eq!(merged, vec!["Budget", "Impact", "Work Packages", "Ethics"]);
    }

    #[test]
    fn test_detect_file_format() {
        assert_eq!(detect_file_format("https://x.org/t.PDF"), "pdf");
        assert_eq!(detect_file_format("https://x.org/t.docx"), "docx");
        assert_eq!(detect_file_format("https://x.org/page"), "webpage");
    }
}
