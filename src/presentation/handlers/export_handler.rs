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

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    application::use_cases::export_use_case::{ExportUseCase, ExportUseCaseError},
    domain::repositories::{
        analytics_repository::AnalyticsRepository,
        collaboration_repository::CollaborationRepository,
        proposal_repository::ProposalRepository,
        proposal_type_repository::ProposalTypeRepository,
    },
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

/// 以附件形式下载提案
pub async fn export_proposal<P, C, T, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path((proposal_id, format)): Path<(Uuid, String)>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ExportUseCase::new(proposal_repo, collab_repo, type_repo, analytics_repo);
    match use_case.export(user.id, proposal_id, &format).await {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, file.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.filename),
                ),
            ],
            file.bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

impl From<ExportUseCaseError> for (StatusCode, String) {
    fn from(err: ExportUseCaseError) -> Self {
        match err {
            ExportUseCaseError::UnsupportedFormat => {
                (StatusCode::BAD_REQUEST, "Unsupported export format".to_string())
            }
            ExportUseCaseError::NotFound => {
                (StatusCode::NOT_FOUND, "Proposal not found".to_string())
            }
            ExportUseCaseError::Export(e) => {
                error!("Export failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Export failed".to_string(),
                )
            }
            ExportUseCaseError::Repository(e) => e.into(),
        }
    }
}
