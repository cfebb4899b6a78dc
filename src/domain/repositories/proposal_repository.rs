// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::proposal::{ProposalFilter, ProposalSection, SavedProposal};
use async_trait::async_trait;
use uuid::Uuid;

/// 提案仓库特质
///
/// 管理保存的提案、章节与版本链
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// 在同一事务中创建提案及其章节
    async fn create(
        &self,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SavedProposal>, RepositoryError>;

    /// 用户的最新版本提案，按创建时间倒序
    async fn list_latest_for_user(
        &self,
        user_id: Uuid,
        filter: &ProposalFilter,
    ) -> Result<Vec<SavedProposal>, RepositoryError>;

    /// 给定 ID 中的最新版本提案，按创建时间倒序
    async fn list_latest_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SavedProposal>, RepositoryError>;

    /// 更新提案的可编辑字段与统计
    async fn update(&self, proposal: &SavedProposal) -> Result<SavedProposal, RepositoryError>;

    /// 在同一事务中更新提案，并以给定章节整体替换原有章节
    async fn update_with_sections(
        &self,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError>;

    /// 删除提案，章节、评论与协作者级联删除
    ///
    /// 删除的是最新版本时，同一版本链中版本号最高的剩余版本成为最新版本
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 同一版本链的全部版本，按版本号降序
    async fn versions(&self, root_id: Uuid) -> Result<Vec<SavedProposal>, RepositoryError>;

    /// 在同一事务中将旧的最新版本标记为非最新，并写入新版本及其章节
    async fn create_version(
        &self,
        previous_id: Uuid,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError>;

    /// 按 `section_order` 升序返回章节
    async fn sections(&self, proposal_id: Uuid) -> Result<Vec<ProposalSection>, RepositoryError>;

    async fn find_section(&self, id: Uuid) -> Result<Option<ProposalSection>, RepositoryError>;

    async fn update_section(
        &self,
        section: &ProposalSection,
    ) -> Result<ProposalSection, RepositoryError>;
}
