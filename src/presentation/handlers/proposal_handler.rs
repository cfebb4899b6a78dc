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
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::{
        dto::proposal_request::{ProposalListQuery, SaveProposalDto, UpdateProposalDto},
        use_cases::proposal_use_case::{ProposalUseCase, ProposalUseCaseError},
    },
    domain::repositories::{
        analytics_repository::AnalyticsRepository,
        collaboration_repository::CollaborationRepository,
        proposal_repository::ProposalRepository,
        proposal_type_repository::ProposalTypeRepository, user_repository::UserRepository,
    },
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

/// 用户自己的提案列表
pub async fn list_proposals<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Query(query): Query<ProposalListQuery>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.list(user.id, query).await {
        Ok(proposals) => (StatusCode::OK, Json(proposals)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 与当前用户共享的提案
pub async fn list_shared_proposals<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.list_shared(user.id).await {
        Ok(proposals) => (StatusCode::OK, Json(proposals)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 保存提案
pub async fn save_proposal<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Json(payload): Json<SaveProposalDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.save(user.id, payload).await {
        Ok(proposal) => (StatusCode::CREATED, Json(proposal)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_proposal<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.get(user.id, proposal_id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_proposal<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<UpdateProposalDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.update(user.id, proposal_id, payload).await {
        Ok(proposal) => (StatusCode::OK, Json(proposal)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_proposal<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.delete(user.id, proposal_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// 版本链
pub async fn list_versions<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.versions(user.id, proposal_id).await {
        Ok(versions) => (StatusCode::OK, Json(versions)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_version<P, C, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = ProposalUseCase::new(
        proposal_repo,
        collab_repo,
        type_repo,
        user_repo,
        analytics_repo,
    );
    match use_case.new_version(user.id, proposal_id).await {
        Ok(proposal) => (StatusCode::CREATED, Json(proposal)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<ProposalUseCaseError> for (StatusCode, String) {
    fn from(err: ProposalUseCaseError) -> Self {
        match err {
            ProposalUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ProposalUseCaseError::NotFound => {
                (StatusCode::NOT_FOUND, "Proposal not found".to_string())
            }
            ProposalUseCaseError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ProposalUseCaseError::Repository(e) => e.into(),
        }
    }
}
