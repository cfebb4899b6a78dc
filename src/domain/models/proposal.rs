// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 保存的提案
///
/// 同一 `root_id` 下的多行构成版本链，其中仅一行 `is_latest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProposal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub proposal_type_id: Option<Uuid>,
    pub title: String,
    pub keywords: String,
    pub description: String,
    /// Markdown 正文
    pub content: String,
    /// 结构化内容：章节、图表、检索概要
    pub content_json: serde_json::Value,
    pub retrieved_papers: serde_json::Value,
    /// 参考文献（APA 列表及引用键）
    pub citations_data: serde_json::Value,
    pub word_count: i32,
    pub citation_count: i32,
    pub page_count: i32,
    pub status: ProposalStatus,
    pub version: i32,
    pub is_latest: bool,
    pub root_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 提案状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Draft,
    InReview,
    Final,
    Submitted,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::InReview => "in_review",
            ProposalStatus::Final => "final",
            ProposalStatus::Submitted => "submitted",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProposalStatus::Draft),
            "in_review" => Ok(ProposalStatus::InReview),
            "final" => Ok(ProposalStatus::Final),
            "submitted" => Ok(ProposalStatus::Submitted),
            other => Err(format!("Invalid proposal status: {}", other)),
        }
    }
}

/// 提案章节
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSection {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub section_name: String,
    pub section_order: i32,
    pub content: String,
    pub word_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// 列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub proposal_type_id: Option<Uuid>,
}

/// 版本摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalVersionSummary {
    pub id: Uuid,
    pub version: i32,
    pub is_latest: bool,
    pub status: ProposalStatus,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&SavedProposal> for ProposalVersionSummary {
    fn from(p: &SavedProposal) -> Self {
        Self {
            id: p.id,
            version: p.version,
            is_latest: p.is_latest,
            status: p.status,
            word_count: p.word_count,
            created_at: p.created_at,
        }
    }
}
