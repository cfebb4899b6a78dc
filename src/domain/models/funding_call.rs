// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 公开的资助申请机会
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundingCall {
    pub title: String,
    pub url: String,
    pub description: String,
    pub funding_body: String,
    pub source: String,
}

/// 从申请页面提取的要求
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallRequirements {
    pub url: String,
    pub title: String,
    pub deadline: Option<String>,
    pub funding_amount: Option<String>,
    pub page_limit: Option<u32>,
    /// 页面中出现的章节名称
    pub required_sections: Vec<String>,
    pub eligibility: Vec<String>,
}

/// 模板链接
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateLink {
    pub title: String,
    pub url: String,
    pub funding_body: String,
    /// pdf、docx、txt 或 webpage
    pub format: String,
}

/// 模板页面的标题结构
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplateStructure {
    pub url: String,
    pub sections: Vec<String>,
}

/// 动态生成的提案结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicStructure {
    pub funding_body: String,
    pub research_area: String,
    pub open_calls: Vec<FundingCall>,
    pub requirements: Option<CallRequirements>,
    pub templates: Vec<TemplateLink>,
    pub template_structures: Vec<TemplateStructure>,
    pub recommended_sections: Vec<String>,
}
