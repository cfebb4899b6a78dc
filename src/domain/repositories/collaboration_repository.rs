// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::collaboration::{Collaborator, Comment};
use async_trait::async_trait;
use uuid::Uuid;

/// 协作仓库特质
///
/// 协作者与评论都挂在具体的提案版本上
#[async_trait]
pub trait CollaborationRepository: Send + Sync {
    /// 添加协作者
    ///
    /// # 返回值
    ///
    /// * `Err(RepositoryError::AlreadyExists)` - 该用户已是协作者
    async fn add_collaborator(
        &self,
        collaborator: &Collaborator,
    ) -> Result<Collaborator, RepositoryError>;

    async fn find_collaborator(
        &self,
        proposal_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Collaborator>, RepositoryError>;

    /// 列出协作者（含用户名），按加入时间升序
    async fn list_collaborators(&self, proposal_id: Uuid)
        -> Result<Vec<Collaborator>, RepositoryError>;

    /// 移除协作者，返回是否存在
    async fn remove_collaborator(
        &self,
        proposal_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepositoryError>;

    /// 用户参与协作的提案 ID
    async fn proposal_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError>;

    /// 将协作者复制到新版本
    async fn copy_collaborators(&self, from: Uuid, to: Uuid) -> Result<(), RepositoryError>;

    async fn add_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError>;

    /// 列出评论（含用户名），按创建时间升序
    async fn list_comments(&self, proposal_id: Uuid) -> Result<Vec<Comment>, RepositoryError>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, RepositoryError>;

    async fn set_comment_resolved(&self, id: Uuid, resolved: bool)
        -> Result<Comment, RepositoryError>;

    async fn delete_comment(&self, id: Uuid) -> Result<(), RepositoryError>;
}
