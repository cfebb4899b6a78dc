// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 资助机构目录
//!
//! 内置的十个资助机构及其章节模板，启动时写入数据库

use crate::domain::models::proposal_type::{ProposalTemplate, ProposalType};
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::RepositoryError;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const CATALOG_YAML: &str = include_str!("../../config/proposal_types.yaml");

/// 目录错误
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 目录中的一个资助机构
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub description: String,
    pub min_pages: i32,
    pub max_pages: i32,
    pub required_sections: Vec<String>,
    #[serde(default)]
    pub optional_sections: Vec<String>,
    #[serde(default)]
    pub template_style: serde_json::Value,
    #[serde(default)]
    pub templates: Vec<CatalogTemplate>,
}

/// 目录中的章节模板，顺序即 `section_order`
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTemplate {
    pub section_name: String,
    pub min_words: i32,
    pub max_words: i32,
    pub description: String,
    pub prompt_template: String,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

/// 解析内置目录
pub fn load_catalog() -> Result<Vec<CatalogEntry>, CatalogError> {
    Ok(serde_yaml::from_str(CATALOG_YAML)?)
}

impl CatalogEntry {
    /// 转换为领域对象，模板按出现顺序编号（从 1 开始）
    pub fn into_domain(self) -> (ProposalType, Vec<ProposalTemplate>) {
        let now = Utc::now();
        let type_id = Uuid::new_v4();

        let templates = self
            .templates
            .into_iter()
            .enumerate()
            .map(|(idx, t)| ProposalTemplate {
                id: Uuid::new_v4(),
                proposal_type_id: type_id,
                section_name: t.section_name,
                section_order: idx as i32 + 1,
                is_required: t.is_required,
                min_words: t.min_words,
                max_words: t.max_words,
                description: t.description,
                prompt_template: t.prompt_template,
            })
            .collect();

        let template_style = if self.template_style.is_null() {
            serde_json::json!({})
        } else {
            self.template_style
        };

        let proposal_type = ProposalType {
            id: type_id,
            code: self.code,
            name: self.name,
            description: self.description,
            min_pages: self.min_pages,
            max_pages: self.max_pages,
            required_sections: self.required_sections,
            optional_sections: self.optional_sections,
            template_style,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        (proposal_type, templates)
    }
}

/// 写入目录中尚不存在的资助机构，返回新建数量
///
/// 已存在的代码保持原样，重复调用无副作用
pub async fn seed_catalog<R>(repo: &R) -> Result<usize, CatalogError>
where
    R: ProposalTypeRepository + ?Sized,
{
    let mut created = 0;

    for entry in load_catalog()? {
        if repo.find_by_code(&entry.code).await?.is_some() {
            debug!("Proposal type {} already present", entry.code);
            continue;
        }

        let (proposal_type, templates) = entry.into_domain();
        repo.create_with_templates(&proposal_type, &templates).await?;
        created += 1;
    }

    info!("Seeded {} proposal types", created);
    Ok(created)
}
