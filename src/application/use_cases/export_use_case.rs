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

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::use_cases::access;
use crate::domain::models::analytics::{AnalyticsAction, AnalyticsEvent};
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::export::{self, ExportDocument, ExportError, ExportFormat};
use crate::infrastructure::metrics;
use crate::utils::text_processing::export_filename;

#[derive(Error, Debug)]
pub enum ExportUseCaseError {
    #[error("Unsupported export format")]
    UnsupportedFormat,
    #[error("Proposal not found")]
    NotFound,
    #[error("Export failed: {0}")]
    Export(ExportError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ExportError> for ExportUseCaseError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) => ExportUseCaseError::UnsupportedFormat,
            other => ExportUseCaseError::Export(other),
        }
    }
}

/// 导出结果
#[derive(Debug)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ExportUseCase<P: ?Sized, C: ?Sized, T: ?Sized, A: ?Sized> {
    proposal_repo: Arc<P>,
    collab_repo: Arc<C>,
    type_repo: Arc<T>,
    analytics_repo: Arc<A>,
}

impl<P, C, T, A> ExportUseCase<P, C, T, A>
where
    P: ProposalRepository + ?Sized + 'static,
    C: CollaborationRepository + ?Sized + 'static,
    T: ProposalTypeRepository + ?Sized + 'static,
    A: AnalyticsRepository + ?Sized + 'static,
{
    pub fn new(
        proposal_repo: Arc<P>,
        collab_repo: Arc<C>,
        type_repo: Arc<T>,
        analytics_repo: Arc<A>,
    ) -> Self {
        Self {
            proposal_repo,
            collab_repo,
            type_repo,
            analytics_repo,
        }
    }

    /// 将提案导出为指定格式，记录一次下载
    pub async fn export(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
        format: &str,
    ) -> Result<ExportedFile, ExportUseCaseError> {
        let format: ExportFormat = format.parse()?;

        let (proposal, _) = access::load_accessible(
            self.proposal_repo.as_ref(),
            self.collab_repo.as_ref(),
            proposal_id,
            user_id,
        )
        .await?
        .ok_or(ExportUseCaseError::NotFound)?;

        let sections = self.proposal_repo.sections(proposal.id).await?;
        let type_name = match proposal.proposal_type_id {
            Some(type_id) => self.type_repo.find_by_id(type_id).await?.map(|t| t.name),
            None => None,
        };

        let document = ExportDocument::from_proposal(&proposal, &sections, type_name.as_deref());
        let bytes = export::export(&document, format)?;
        debug!(
            "Exported proposal {} as {} ({} bytes)",
            proposal.id,
            format,
            bytes.len()
        );

        metrics::record_export(format.as_str());
        let event = AnalyticsEvent::new(
            user_id,
            AnalyticsAction::Download,
            Some(proposal.id),
            json!({ "format": format.as_str() }),
        );
        if let Err(e) = self.analytics_repo.record(&event).await {
            warn!("Failed to record download event: {}", e);
        }

        Ok(ExportedFile {
            filename: export_filename(&proposal.title, format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }
}
