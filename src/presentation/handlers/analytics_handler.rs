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

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    application::use_cases::analytics_use_case::{AnalyticsUseCase, AnalyticsUseCaseError},
    domain::repositories::{
        analytics_repository::AnalyticsRepository, proposal_repository::ProposalRepository,
        proposal_type_repository::ProposalTypeRepository, user_repository::UserRepository,
    },
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

pub async fn dashboard<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = AnalyticsUseCase::new(proposal_repo, type_repo, user_repo, analytics_repo);
    match use_case.dashboard(user.id).await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 用户使用统计
pub async fn analytics<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    user: CurrentUser,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = AnalyticsUseCase::new(proposal_repo, type_repo, user_repo, analytics_repo);
    match use_case.summary(user.id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<AnalyticsUseCaseError> for (StatusCode, String) {
    fn from(err: AnalyticsUseCaseError) -> Self {
        match err {
            AnalyticsUseCaseError::Repository(e) => e.into(),
        }
    }
}
