// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 资助机构的提案类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalType {
    pub id: Uuid,
    /// 唯一代码，如 `horizon_europe`
    pub code: String,
    pub name: String,
    pub description: String,
    pub min_pages: i32,
    pub max_pages: i32,
    pub required_sections: Vec<String>,
    pub optional_sections: Vec<String>,
    /// 样式要求，如字体、字号、页边距
    pub template_style: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 提案类型的章节模板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalTemplate {
    pub id: Uuid,
    pub proposal_type_id: Uuid,
    pub section_name: String,
    pub section_order: i32,
    pub is_required: bool,
    pub min_words: i32,
    pub max_words: i32,
    pub description: String,
    pub prompt_template: String,
}

/// 带模板的提案类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalTypeWithTemplates {
    #[serde(flatten)]
    pub proposal_type: ProposalType,
    /// 按 `section_order` 升序
    pub templates: Vec<ProposalTemplate>,
}
