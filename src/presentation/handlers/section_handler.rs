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
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::{
        dto::proposal_request::{AiEditDto, UpdateSectionDto},
        use_cases::section_use_case::{SectionUseCase, SectionUseCaseError},
    },
    domain::{
        repositories::{
            analytics_repository::AnalyticsRepository,
            collaboration_repository::CollaborationRepository,
            proposal_repository::ProposalRepository,
        },
        services::llm_service::LlmClient,
    },
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

/// 覆盖章节正文
pub async fn update_section<P, C, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    user: CurrentUser,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<UpdateSectionDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = SectionUseCase::new(proposal_repo, collab_repo, analytics_repo, llm);
    match use_case.update_section(user.id, section_id, payload).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 按指令改写章节或选中文本，结果不自动保存
pub async fn ai_edit_section<P, C, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    user: CurrentUser,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<AiEditDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = SectionUseCase::new(proposal_repo, collab_repo, analytics_repo, llm);
    match use_case.ai_edit(user.id, section_id, payload).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<SectionUseCaseError> for (StatusCode, String) {
    fn from(err: SectionUseCaseError) -> Self {
        match err {
            SectionUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            SectionUseCaseError::NotFound => {
                (StatusCode::NOT_FOUND, "Section not found".to_string())
            }
            SectionUseCaseError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            SectionUseCaseError::Llm(e) => e.into(),
            SectionUseCaseError::Repository(e) => e.into(),
        }
    }
}
