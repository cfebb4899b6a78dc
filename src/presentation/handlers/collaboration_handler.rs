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
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::{
        dto::collaboration_request::{AddCollaboratorDto, AddCommentDto, ResolveCommentDto},
        use_cases::collaboration_use_case::{CollaborationUseCase, CollaborationUseCaseError},
    },
    domain::repositories::{
        collaboration_repository::CollaborationRepository,
        proposal_repository::ProposalRepository, user_repository::UserRepository,
    },
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

pub async fn list_collaborators<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case.list_collaborators(user.id, proposal_id).await {
        Ok(collaborators) => (StatusCode::OK, Json(collaborators)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 按用户名邀请协作者
pub async fn add_collaborator<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<AddCollaboratorDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case.add_collaborator(user.id, proposal_id, payload).await {
        Ok(collaborator) => (StatusCode::CREATED, Json(collaborator)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn remove_collaborator<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path((proposal_id, collaborator_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case
        .remove_collaborator(user.id, proposal_id, collaborator_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_comments<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case.list_comments(user.id, proposal_id).await {
        Ok(comments) => (StatusCode::OK, Json(comments)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn add_comment<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<AddCommentDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case.add_comment(user.id, proposal_id, payload).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 标记评论为已解决（或重新打开）
pub async fn resolve_comment<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(comment_id): Path<Uuid>,
    body: Bytes,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    // Empty body means "resolve"
    let resolved = if body.is_empty() {
        ResolveCommentDto::default().resolved
    } else {
        match serde_json::from_slice::<ResolveCommentDto>(&body) {
            Ok(dto) => dto.resolved,
            Err(e) => return error_response((StatusCode::BAD_REQUEST, e.to_string())),
        }
    };
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case
        .set_comment_resolved(user.id, comment_id, resolved)
        .await
    {
        Ok(comment) => (StatusCode::OK, Json(comment)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_comment<P, C, U>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(collab_repo): Extension<Arc<C>>,
    Extension(user_repo): Extension<Arc<U>>,
    user: CurrentUser,
    Path(comment_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    C: CollaborationRepository + 'static,
    U: UserRepository + 'static,
{
    let use_case = CollaborationUseCase::new(proposal_repo, collab_repo, user_repo);
    match use_case.delete_comment(user.id, comment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

impl From<CollaborationUseCaseError> for (StatusCode, String) {
    fn from(err: CollaborationUseCaseError) -> Self {
        match err {
            CollaborationUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            CollaborationUseCaseError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CollaborationUseCaseError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            CollaborationUseCaseError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            CollaborationUseCaseError::Repository(e) => e.into(),
        }
    }
}
