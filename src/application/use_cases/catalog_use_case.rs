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

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::proposal_type::{ProposalType, ProposalTypeWithTemplates};
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::RepositoryError;

#[derive(Error, Debug)]
pub enum CatalogUseCaseError {
    #[error("Proposal type not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CatalogUseCase<T: ?Sized> {
    type_repo: Arc<T>,
}

impl<T> CatalogUseCase<T>
where
    T: ProposalTypeRepository + ?Sized + 'static,
{
    pub fn new(type_repo: Arc<T>) -> Self {
        Self { type_repo }
    }

    pub async fn list_active_types(&self) -> Result<Vec<ProposalType>, CatalogUseCaseError> {
        Ok(self.type_repo.list_active().await?)
    }

    /// 启用的提案类型及其按顺序排列的章节模板
    pub async fn get_type_with_templates(
        &self,
        id: Uuid,
    ) -> Result<ProposalTypeWithTemplates, CatalogUseCaseError> {
        let proposal_type = self
            .type_repo
            .find_by_id(id)
            .await?
            .filter(|t| t.is_active)
            .ok_or(CatalogUseCaseError::NotFound)?;

        let templates = self.type_repo.templates_for(proposal_type.id).await?;

        Ok(ProposalTypeWithTemplates {
            proposal_type,
            templates,
        })
    }
}
