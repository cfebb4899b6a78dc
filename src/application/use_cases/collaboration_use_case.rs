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

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::collaboration_request::{AddCollaboratorDto, AddCommentDto};
use crate::application::dto::proposal_request::AccessLevel;
use crate::application::use_cases::access;
use crate::domain::models::collaboration::{Collaborator, Comment};
use crate::domain::models::proposal::SavedProposal;
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;

#[derive(Error, Debug)]
pub enum CollaborationUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 协作者与评论
pub struct CollaborationUseCase<P: ?Sized, C: ?Sized, U: ?Sized> {
    proposal_repo: Arc<P>,
    collab_repo: Arc<C>,
    user_repo: Arc<U>,
}

impl<P, C, U> CollaborationUseCase<P, C, U>
where
    P: ProposalRepository + ?Sized + 'static,
    C: CollaborationRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
{
    pub fn new(proposal_repo: Arc<P>, collab_repo: Arc<C>, user_repo: Arc<U>) -> Self {
        Self {
            proposal_repo,
            collab_repo,
            user_repo,
        }
    }

    /// 按用户名添加协作者，仅所有者可用
    pub async fn add_collaborator(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
        dto: AddCollaboratorDto,
    ) -> Result<Collaborator, CollaborationUseCaseError> {
        dto.validate().map_err(|_| {
            CollaborationUseCaseError::ValidationError("Username is required".to_string())
        })?;
        let proposal = self.load_owned(user_id, proposal_id).await?;

        let invitee = self
            .user_repo
            .find_by_username(dto.username.trim())
            .await?
            .ok_or_else(|| CollaborationUseCaseError::NotFound("User not found".to_string()))?;
        if invitee.id == proposal.user_id {
            return Err(CollaborationUseCaseError::ValidationError(
                "You cannot add yourself as a collaborator".to_string(),
            ));
        }

        let collaborator = Collaborator {
            id: Uuid::new_v4(),
            proposal_id: proposal.id,
            user_id: invitee.id,
            username: invitee.username.clone(),
            role: dto.role,
            invited_by: user_id,
            created_at: Utc::now(),
        };

        match self.collab_repo.add_collaborator(&collaborator).await {
            Ok(created) => {
                info!(
                    "Added {} as {} on proposal {}",
                    invitee.username, created.role, proposal.id
                );
                Ok(Collaborator {
                    username: invitee.username,
                    ..created
                })
            }
            Err(RepositoryError::AlreadyExists(_)) => Err(CollaborationUseCaseError::Conflict(
                "User is already a collaborator".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_collaborators(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Vec<Collaborator>, CollaborationUseCaseError> {
        let (proposal, _) = self.load(user_id, proposal_id).await?;
        Ok(self.collab_repo.list_collaborators(proposal.id).await?)
    }

    pub async fn remove_collaborator(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
        collaborator_user_id: Uuid,
    ) -> Result<(), CollaborationUseCaseError> {
        let proposal = self.load_owned(user_id, proposal_id).await?;
        if !self
            .collab_repo
            .remove_collaborator(proposal.id, collaborator_user_id)
            .await?
        {
            return Err(CollaborationUseCaseError::NotFound(
                "Collaborator not found".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn list_comments(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Vec<Comment>, CollaborationUseCaseError> {
        let (proposal, _) = self.load(user_id, proposal_id).await?;
        Ok(self.collab_repo.list_comments(proposal.id).await?)
    }

    /// 添加评论，可指定所属章节
    pub async fn add_comment(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
        dto: AddCommentDto,
    ) -> Result<Comment, CollaborationUseCaseError> {
        let content = dto.content.trim();
        if content.is_empty() {
            return Err(CollaborationUseCaseError::ValidationError(
                "Comment content is required".to_string(),
            ));
        }

        let (proposal, _) = self.load(user_id, proposal_id).await?;

        if let Some(section_id) = dto.section_id {
            let belongs = self
                .proposal_repo
                .find_section(section_id)
                .await?
                .is_some_and(|s| s.proposal_id == proposal.id);
            if !belongs {
                return Err(CollaborationUseCaseError::ValidationError(
                    "Section does not belong to this proposal".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            proposal_id: proposal.id,
            section_id: dto.section_id,
            user_id,
            username: String::new(),
            content: content.to_string(),
            resolved: false,
            created_at: now,
            updated_at: now,
        };

        let mut created = self.collab_repo.add_comment(&comment).await?;
        if created.username.is_empty() {
            if let Some(author) = self.user_repo.find_by_id(user_id).await? {
                created.username = author.username;
            }
        }
        Ok(created)
    }

    /// 标记评论的解决状态，评论作者或提案所有者可用
    pub async fn set_comment_resolved(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        resolved: bool,
    ) -> Result<Comment, CollaborationUseCaseError> {
        let comment = self.load_moderated_comment(user_id, comment_id).await?;
        Ok(self
            .collab_repo
            .set_comment_resolved(comment.id, resolved)
            .await?)
    }

    pub async fn delete_comment(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), CollaborationUseCaseError> {
        let comment = self.load_moderated_comment(user_id, comment_id).await?;
        self.collab_repo.delete_comment(comment.id).await?;
        Ok(())
    }

    async fn load_moderated_comment(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, CollaborationUseCaseError> {
        let not_found = || CollaborationUseCaseError::NotFound("Comment not found".to_string());

        let comment = self
            .collab_repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(not_found)?;
        let (_, access) = access::load_accessible(
            self.proposal_repo.as_ref(),
            self.collab_repo.as_ref(),
            comment.proposal_id,
            user_id,
        )
        .await?
        .ok_or_else(not_found)?;

        if comment.user_id != user_id && !access.is_owner() {
            return Err(CollaborationUseCaseError::Forbidden(
                "Only the comment author or proposal owner can do this".to_string(),
            ));
        }
        Ok(comment)
    }

    async fn load(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<(SavedProposal, AccessLevel), CollaborationUseCaseError> {
        access::load_accessible(
            self.proposal_repo.as_ref(),
            self.collab_repo.as_ref(),
            proposal_id,
            user_id,
        )
        .await?
        .ok_or_else(|| CollaborationUseCaseError::NotFound("Proposal not found".to_string()))
    }

    async fn load_owned(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<SavedProposal, CollaborationUseCaseError> {
        let (proposal, access) = self.load(user_id, proposal_id).await?;
        if !access.is_owner() {
            return Err(CollaborationUseCaseError::Forbidden(
                "Only the proposal owner can manage collaborators".to_string(),
            ));
        }
        Ok(proposal)
    }
}
