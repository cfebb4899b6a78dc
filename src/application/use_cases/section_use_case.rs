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
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::proposal_request::{
    AccessLevel, AiEditDto, AiEditResultDto, SectionUpdatedDto, UpdateSectionDto,
};
use crate::application::use_cases::access;
use crate::domain::models::analytics::{AnalyticsAction, AnalyticsEvent};
use crate::domain::models::proposal::{ProposalSection, SavedProposal};
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::llm_service::{LlmClient, LlmError};
use crate::domain::services::proposal_generator::ProposalGenerator;
use crate::utils::text_processing::count_words;

#[derive(Error, Debug)]
pub enum SectionUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Section not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 章节编辑：手工修改与 AI 改写
pub struct SectionUseCase<P: ?Sized, C: ?Sized, A: ?Sized> {
    proposal_repo: Arc<P>,
    collab_repo: Arc<C>,
    analytics_repo: Arc<A>,
    llm: Arc<dyn LlmClient>,
}

impl<P, C, A> SectionUseCase<P, C, A>
where
    P: ProposalRepository + ?Sized + 'static,
    C: CollaborationRepository + ?Sized + 'static,
    A: AnalyticsRepository + ?Sized + 'static,
{
    pub fn new(
        proposal_repo: Arc<P>,
        collab_repo: Arc<C>,
        analytics_repo: Arc<A>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            proposal_repo,
            collab_repo,
            analytics_repo,
            llm,
        }
    }

    /// 覆盖章节正文，并重新统计章节与提案的单词数
    pub async fn update_section(
        &self,
        user_id: Uuid,
        section_id: Uuid,
        dto: UpdateSectionDto,
    ) -> Result<SectionUpdatedDto, SectionUseCaseError> {
        let (mut section, mut proposal, _) = self.load_editable(user_id, section_id).await?;

        section.word_count = count_words(&dto.content) as i32;
        section.content = dto.content;
        section.updated_at = Utc::now();
        let section = self.proposal_repo.update_section(&section).await?;

        let total: i32 = self
            .proposal_repo
            .sections(proposal.id)
            .await?
            .iter()
            .map(|s| s.word_count)
            .sum();
        proposal.word_count = total;
        proposal.updated_at = Utc::now();
        let proposal = self.proposal_repo.update(&proposal).await?;

        let event = AnalyticsEvent::new(
            user_id,
            AnalyticsAction::Edit,
            Some(proposal.id),
            json!({ "section": section.section_name, "word_count": section.word_count }),
        );
        if let Err(e) = self.analytics_repo.record(&event).await {
            warn!("Failed to record edit event: {}", e);
        }

        Ok(SectionUpdatedDto {
            section,
            proposal_word_count: proposal.word_count,
        })
    }

    /// 按指令改写章节或选中片段，结果不保存
    pub async fn ai_edit(
        &self,
        user_id: Uuid,
        section_id: Uuid,
        dto: AiEditDto,
    ) -> Result<AiEditResultDto, SectionUseCaseError> {
        dto.validate()
            .map_err(|_| SectionUseCaseError::ValidationError("Instruction is required".to_string()))?;
        if dto.instruction.trim().is_empty() {
            return Err(SectionUseCaseError::ValidationError(
                "Instruction is required".to_string(),
            ));
        }

        let (section, _, _) = self.load_editable(user_id, section_id).await?;
        let text = match dto.selected_text.as_deref().map(str::trim) {
            Some(selected) if !selected.is_empty() => selected.to_string(),
            _ => section.content.clone(),
        };

        // Papers are irrelevant for free-form edits
        let generator = ProposalGenerator::new(self.llm.clone(), 0);
        let edited_text = generator.edit_text(dto.instruction.trim(), &text).await?;

        Ok(AiEditResultDto {
            section_id: section.id,
            edited_text,
        })
    }

    async fn load_editable(
        &self,
        user_id: Uuid,
        section_id: Uuid,
    ) -> Result<(ProposalSection, SavedProposal, AccessLevel), SectionUseCaseError> {
        let section = self
            .proposal_repo
            .find_section(section_id)
            .await?
            .ok_or(SectionUseCaseError::NotFound)?;

        let (proposal, access) = access::load_accessible(
            self.proposal_repo.as_ref(),
            self.collab_repo.as_ref(),
            section.proposal_id,
            user_id,
        )
        .await?
        .ok_or(SectionUseCaseError::NotFound)?;

        if !access.can_edit() {
            return Err(SectionUseCaseError::Forbidden(
                "You do not have permission to edit this proposal".to_string(),
            ));
        }

        Ok((section, proposal, access))
    }
}
