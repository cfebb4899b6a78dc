// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use crate::domain::models::paper::Paper;
use crate::domain::models::research::WebItem;

/// 论文去重器
///
/// 非空 DOI 已出现过则视为重复；否则按小写、去首尾空白后的标题判断
#[derive(Default)]
pub struct PaperDeduplicator {
    seen_dois: HashSet<String>,
    seen_titles: HashSet<String>,
}

impl PaperDeduplicator {
    /// 创建新的去重器
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理标题，应用清理规则
    fn normalize_title(title: &str) -> String {
        title.trim().to_lowercase()
    }

    /// 记录论文，返回是否为重复项
    pub fn is_duplicate(&mut self, paper: &Paper) -> bool {
        let title = Self::normalize_title(&paper.title);
        let doi = paper.doi().map(str::to_string);

        let duplicate = match &doi {
            Some(doi) if self.seen_dois.contains(doi) => true,
            _ => self.seen_titles.contains(&title),
        };

        if !duplicate {
            self.seen_titles.insert(title);
            if let Some(doi) = doi {
                self.seen_dois.insert(doi);
            }
        }

        duplicate
    }

    /// 保持原有顺序去重
    pub fn deduplicate(&mut self, papers: Vec<Paper>) -> Vec<Paper> {
        papers
            .into_iter()
            .filter(|paper| !self.is_duplicate(paper))
            .collect()
    }
}

/// 网页条目按 URL 去重（去掉片段与末尾斜杠后比较）
pub fn dedupe_web_items(items: Vec<WebItem>) -> Vec<WebItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let mut url = item.url.clone();
            if let Some(pos) = url.find('#') {
                url.truncate(pos);
            }
            seen.insert(url.trim_end_matches('/').to_lowercase())
        })
        .collect()
}
