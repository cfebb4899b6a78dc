// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::proposal_type::{ProposalTemplate, ProposalType};
use async_trait::async_trait;
use uuid::Uuid;

/// 提案类型仓库特质
#[async_trait]
pub trait ProposalTypeRepository: Send + Sync {
    /// 列出所有启用的提案类型，按名称排序
    async fn list_active(&self) -> Result<Vec<ProposalType>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProposalType>, RepositoryError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<ProposalType>, RepositoryError>;

    /// 按 `section_order` 升序返回模板
    async fn templates_for(&self, proposal_type_id: Uuid)
        -> Result<Vec<ProposalTemplate>, RepositoryError>;

    /// 在同一事务中创建提案类型及其模板
    ///
    /// # 返回值
    ///
    /// * `Err(RepositoryError::AlreadyExists)` - 代码已存在
    async fn create_with_templates(
        &self,
        proposal_type: &ProposalType,
        templates: &[ProposalTemplate],
    ) -> Result<ProposalType, RepositoryError>;
}
