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
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::{
    application::{
        dto::auth_request::{AuthSessionDto, LoginRequestDto, RegisterRequestDto, UpdateProfileDto},
        use_cases::auth_use_case::{AuthUseCase, AuthUseCaseError},
    },
    config::settings::Settings,
    domain::repositories::user_repository::UserRepository,
    presentation::{
        errors::error_response,
        extractors::current_user::CurrentUser,
        middleware::auth_middleware::{clear_session_cookie, session_cookie},
    },
};

fn session_response(status: StatusCode, settings: &Settings, session: AuthSessionDto) -> Response {
    let cookie = session_cookie(&settings.auth, &session.token);
    (status, [(header::SET_COOKIE, cookie)], Json(session)).into_response()
}

/// 注册并登录
pub async fn register<U>(
    Extension(user_repo): Extension<Arc<U>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<RegisterRequestDto>,
) -> impl IntoResponse
where
    U: UserRepository + 'static,
{
    let use_case = AuthUseCase::new(user_repo, settings.auth.clone());
    match use_case.register(payload).await {
        Ok(session) => session_response(StatusCode::CREATED, &settings, session),
        Err(e) => error_response(e),
    }
}

/// 用户名密码登录
pub async fn login<U>(
    Extension(user_repo): Extension<Arc<U>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<LoginRequestDto>,
) -> impl IntoResponse
where
    U: UserRepository + 'static,
{
    let use_case = AuthUseCase::new(user_repo, settings.auth.clone());
    match use_case.login(payload).await {
        Ok(session) => session_response(StatusCode::OK, &settings, session),
        Err(e) => error_response(e),
    }
}

/// 注销当前会话
pub async fn logout<U>(
    Extension(user_repo): Extension<Arc<U>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: CurrentUser,
) -> impl IntoResponse
where
    U: UserRepository + 'static,
{
    let use_case = AuthUseCase::new(user_repo, settings.auth.clone());
    match use_case.logout(&user.token_hash).await {
        Ok(()) => (
            StatusCode::OK,
            [(header::SET_COOKIE, clear_session_cookie(&settings.auth))],
            Json(json!({ "message": "Logged out" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_profile<U>(
    Extension(user_repo): Extension<Arc<U>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: CurrentUser,
) -> impl IntoResponse
where
    U: UserRepository + 'static,
{
    let use_case = AuthUseCase::new(user_repo, settings.auth.clone());
    match use_case.get_profile(user.id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_profile<U>(
    Extension(user_repo): Extension<Arc<U>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileDto>,
) -> impl IntoResponse
where
    U: UserRepository + 'static,
{
    let use_case = AuthUseCase::new(user_repo, settings.auth.clone());
    match use_case.update_profile(user.id, payload).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response(e),
    }
}

impl From<AuthUseCaseError> for (StatusCode, String) {
    fn from(err: AuthUseCaseError) -> Self {
        match err {
            AuthUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthUseCaseError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthUseCaseError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AuthUseCaseError::ProfileNotFound => {
                (StatusCode::NOT_FOUND, "Profile not found".to_string())
            }
            AuthUseCaseError::PasswordHash(e) => {
                error!("Password hashing failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthUseCaseError::Repository(e) => e.into(),
        }
    }
}
