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
    application::use_cases::catalog_use_case::{CatalogUseCase, CatalogUseCaseError},
    domain::repositories::proposal_type_repository::ProposalTypeRepository,
    presentation::errors::error_response,
};

/// 启用的提案类型
pub async fn list_proposal_types<T>(Extension(type_repo): Extension<Arc<T>>) -> impl IntoResponse
where
    T: ProposalTypeRepository + 'static,
{
    match CatalogUseCase::new(type_repo).list_active_types().await {
        Ok(types) => (StatusCode::OK, Json(types)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 提案类型及其章节模板
pub async fn get_proposal_type<T>(
    Extension(type_repo): Extension<Arc<T>>,
    Path(type_id): Path<Uuid>,
) -> impl IntoResponse
where
    T: ProposalTypeRepository + 'static,
{
    match CatalogUseCase::new(type_repo)
        .get_type_with_templates(type_id)
        .await
    {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<CatalogUseCaseError> for (StatusCode, String) {
    fn from(err: CatalogUseCaseError) -> Self {
        match err {
            CatalogUseCaseError::NotFound => {
                (StatusCode::NOT_FOUND, "Proposal type not found".to_string())
            }
            CatalogUseCaseError::Repository(e) => e.into(),
        }
    }
}
