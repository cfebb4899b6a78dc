// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::collaboration::{Collaborator, CollaboratorRole, Comment};
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{proposal_collaborator, proposal_comment, user};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 协作仓库实现
pub struct CollaborationRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CollaborationRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 批量查询用户名
    async fn usernames(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}

fn to_collaborator(m: proposal_collaborator::Model) -> Result<Collaborator, RepositoryError> {
    let role = m
        .role
        .parse::<CollaboratorRole>()
        .map_err(RepositoryError::Corrupted)?;
    Ok(Collaborator {
        id: m.id,
        proposal_id: m.proposal_id,
        user_id: m.user_id,
        username: String::new(),
        role,
        invited_by: m.invited_by,
        created_at: m.created_at.into(),
    })
}

fn to_comment(m: proposal_comment::Model) -> Comment {
    Comment {
        id: m.id,
        proposal_id: m.proposal_id,
        section_id: m.section_id,
        user_id: m.user_id,
        username: String::new(),
        content: m.content,
        resolved: m.resolved,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    }
}

#[async_trait]
impl CollaborationRepository for CollaborationRepositoryImpl {
    async fn add_collaborator(
        &self,
        collaborator: &Collaborator,
    ) -> Result<Collaborator, RepositoryError> {
        if self
            .find_collaborator(collaborator.proposal_id, collaborator.user_id)
            .await?
            .is_some()
        {
            return Err(RepositoryError::AlreadyExists("collaborator".to_string()));
        }

        proposal_collaborator::ActiveModel {
            id: Set(collaborator.id),
            proposal_id: Set(collaborator.proposal_id),
            user_id: Set(collaborator.user_id),
            role: Set(collaborator.role.to_string()),
            invited_by: Set(collaborator.invited_by),
            created_at: Set(collaborator.created_at.into()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "collaborator"))?;

        Ok(collaborator.clone())
    }

    async fn find_collaborator(
        &self,
        proposal_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Collaborator>, RepositoryError> {
        proposal_collaborator::Entity::find()
            .filter(proposal_collaborator::Column::ProposalId.eq(proposal_id))
            .filter(proposal_collaborator::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .map(to_collaborator)
            .transpose()
    }

    async fn list_collaborators(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<Collaborator>, RepositoryError> {
        let models = proposal_collaborator::Entity::find()
            .filter(proposal_collaborator::Column::ProposalId.eq(proposal_id))
            .order_by_asc(proposal_collaborator::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        let names = self
            .usernames(models.iter().map(|m| m.user_id).collect())
            .await?;

        models
            .into_iter()
            .map(|m| {
                let mut collaborator = to_collaborator(m)?;
                collaborator.username = names
                    .get(&collaborator.user_id)
                    .cloned()
                    .unwrap_or_default();
                Ok(collaborator)
            })
            .collect()
    }

    async fn remove_collaborator(
        &self,
        proposal_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let result = proposal_collaborator::Entity::delete_many()
            .filter(proposal_collaborator::Column::ProposalId.eq(proposal_id))
            .filter(proposal_collaborator::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn proposal_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let models = proposal_collaborator::Entity::find()
            .filter(proposal_collaborator::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(|m| m.proposal_id).collect())
    }

    async fn copy_collaborators(&self, from: Uuid, to: Uuid) -> Result<(), RepositoryError> {
        let models = proposal_collaborator::Entity::find()
            .filter(proposal_collaborator::Column::ProposalId.eq(from))
            .all(self.db.as_ref())
            .await?;

        for m in models {
            proposal_collaborator::ActiveModel {
                id: Set(Uuid::new_v4()),
                proposal_id: Set(to),
                user_id: Set(m.user_id),
                role: Set(m.role),
                invited_by: Set(m.invited_by),
                created_at: Set(m.created_at),
            }
            .insert(self.db.as_ref())
            .await?;
        }
        Ok(())
    }

    async fn add_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError> {
        proposal_comment::ActiveModel {
            id: Set(comment.id),
            proposal_id: Set(comment.proposal_id),
            section_id: Set(comment.section_id),
            user_id: Set(comment.user_id),
            content: Set(comment.content.clone()),
            resolved: Set(comment.resolved),
            created_at: Set(comment.created_at.into()),
            updated_at: Set(comment.updated_at.into()),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(comment.clone())
    }

    async fn list_comments(&self, proposal_id: Uuid) -> Result<Vec<Comment>, RepositoryError> {
        let models = proposal_comment::Entity::find()
            .filter(proposal_comment::Column::ProposalId.eq(proposal_id))
            .order_by_asc(proposal_comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        let names = self
            .usernames(models.iter().map(|m| m.user_id).collect())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let mut comment = to_comment(m);
                comment.username = names.get(&comment.user_id).cloned().unwrap_or_default();
                comment
            })
            .collect())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, RepositoryError> {
        let model = proposal_comment::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(to_comment))
    }

    async fn set_comment_resolved(
        &self,
        id: Uuid,
        resolved: bool,
    ) -> Result<Comment, RepositoryError> {
        let mut model: proposal_comment::ActiveModel = proposal_comment::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        model.resolved = Set(resolved);
        model.updated_at = Set(Utc::now().into());

        let updated = model.update(self.db.as_ref()).await?;
        Ok(to_comment(updated))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = proposal_comment::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
