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
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::{
    application::{
        dto::discovery_request::{CallRequirementsDto, DiscoverCallsQuery, DynamicStructureQuery},
        use_cases::discovery_use_case::{DiscoveryUseCase, DiscoveryUseCaseError},
    },
    infrastructure::discovery::{DiscoveryError, FundingDiscovery},
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

/// 检索开放中的资助机会
pub async fn discover_calls(
    Extension(discovery): Extension<Arc<FundingDiscovery>>,
    _user: CurrentUser,
    Query(query): Query<DiscoverCallsQuery>,
) -> impl IntoResponse {
    let calls = DiscoveryUseCase::new(discovery).discover_calls(query).await;
    (StatusCode::OK, Json(calls))
}

/// 提取资助公告页面中的申请要求
pub async fn call_requirements(
    Extension(discovery): Extension<Arc<FundingDiscovery>>,
    _user: CurrentUser,
    Json(payload): Json<CallRequirementsDto>,
) -> impl IntoResponse {
    match DiscoveryUseCase::new(discovery)
        .call_requirements(payload)
        .await
    {
        Ok(requirements) => (StatusCode::OK, Json(requirements)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 按资助机构生成章节结构
pub async fn dynamic_structure(
    Extension(discovery): Extension<Arc<FundingDiscovery>>,
    _user: CurrentUser,
    Query(query): Query<DynamicStructureQuery>,
) -> impl IntoResponse {
    match DiscoveryUseCase::new(discovery).dynamic_structure(query).await {
        Ok(structure) => (StatusCode::OK, Json(structure)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<DiscoveryUseCaseError> for (StatusCode, String) {
    fn from(err: DiscoveryUseCaseError) -> Self {
        match err {
            DiscoveryUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            DiscoveryUseCaseError::Discovery(DiscoveryError::InvalidUrl(url)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid URL: {url}"))
            }
            DiscoveryUseCaseError::Discovery(e) => {
                warn!("Funding call fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        }
    }
}
