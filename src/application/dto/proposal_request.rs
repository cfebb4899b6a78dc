// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::collaboration::Collaborator;
use crate::domain::models::proposal::{
    ProposalSection, ProposalStatus, ProposalVersionSummary, SavedProposal,
};
use crate::domain::models::proposal_type::ProposalType;
use crate::domain::models::user::UserProfile;

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct SaveProposalDto {
    #[serde(default)]
    #[validate(length(max = 500))]
    pub title: String,
    pub keywords: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub proposal_type_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateProposalDto {
    #[validate(length(max = 500))]
    pub title: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub status: Option<ProposalStatus>,
}

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ProposalListQuery {
    pub status: Option<ProposalStatus>,
    pub proposal_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateSectionDto {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AiEditDto {
    /// 只改写选中的片段，缺省时改写整个章节
    pub selected_text: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Instruction is required"))]
    pub instruction: String,
}

/// 当前用户对提案的访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Owner,
    Editor,
    Viewer,
}

impl AccessLevel {
    pub fn can_edit(&self) -> bool {
        matches!(self, AccessLevel::Owner | AccessLevel::Editor)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, AccessLevel::Owner)
    }
}

/// 提案详情
#[derive(Debug, Serialize)]
pub struct ProposalDetailDto {
    pub proposal: SavedProposal,
    pub proposal_type: Option<ProposalType>,
    pub sections: Vec<ProposalSection>,
    pub versions: Vec<ProposalVersionSummary>,
    pub collaborators: Vec<Collaborator>,
    pub access: AccessLevel,
}

#[derive(Debug, Serialize)]
pub struct SectionUpdatedDto {
    pub section: ProposalSection,
    pub proposal_word_count: i32,
}

#[derive(Debug, Serialize)]
pub struct AiEditResultDto {
    pub section_id: Uuid,
    pub edited_text: String,
}

/// 仪表盘
#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub proposal_types: Vec<ProposalType>,
    pub recent_proposals: Vec<SavedProposal>,
    pub total_proposals: usize,
    pub total_words: i64,
    pub profile: Option<UserProfile>,
}
