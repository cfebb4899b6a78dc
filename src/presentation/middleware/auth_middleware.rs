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
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::application::use_cases::auth_use_case::AuthUseCase;
use crate::config::settings::AuthSettings;
use crate::domain::repositories::user_repository::UserRepository;
use crate::presentation::extractors::current_user::CurrentUser;

/// 登录入口
pub const LOGIN_PATH: &str = "/v1/auth/login";

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 用户与会话仓库
    pub user_repo: Arc<dyn UserRepository>,
    pub settings: AuthSettings,
}

/// 认证中间件
///
/// 从 `Authorization: Bearer` 头或会话 Cookie 读取令牌并解析当前用户
///
/// # 参数
///
/// * `state` - 认证状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// 认证成功时继续处理请求，并在扩展中插入 [`CurrentUser`]；
/// 失败时浏览器请求重定向到登录页，其余请求返回 401
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    debug!("AuthMiddleware processing path: {}", path);

    let Some(token) = session_token(req.headers(), &state.settings.cookie_name) else {
        return unauthenticated(req.headers(), &req);
    };

    let auth = AuthUseCase::new(state.user_repo.clone(), state.settings.clone());
    match auth.authenticate(&token).await {
        Ok(Some((user, token_hash))) => {
            req.extensions_mut().insert(CurrentUser {
                id: user.id,
                username: user.username,
                token_hash,
            });
            next.run(req).await
        }
        Ok(None) => {
            debug!("No valid session for {}", path);
            unauthenticated(req.headers(), &req)
        }
        Err(e) => {
            error!("Database error checking session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

/// 读取会话令牌，Bearer 头优先于 Cookie
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// 登录后下发的会话 Cookie
pub fn session_cookie(settings: &AuthSettings, token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        settings.cookie_name,
        token,
        settings.session_ttl_hours * 3600
    )
}

/// 登出时清除会话 Cookie
pub fn clear_session_cookie(settings: &AuthSettings) -> String {
    format!(
        "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
        settings.cookie_name
    )
}

fn unauthenticated(headers: &HeaderMap, req: &Request) -> Response {
    let wants_html = headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));

    if wants_html {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        return Redirect::to(&format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next)))
            .into_response();
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Authentication required",
            "login_url": LOGIN_PATH,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::auth_request::RegisterRequestDto;
    use crate::config::settings::Settings;
    use crate::infrastructure::database::connection::connect_and_migrate;
    use crate::infrastructure::repositories::user_repo_impl::UserRepositoryImpl;
    use axum::{body::Body, http::HeaderValue, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn whoami(user: CurrentUser) -> String {
        user.username
    }

    async fn setup_app() -> (Router, String) {
        let settings = Settings::with_overrides(&[("database.url", "sqlite::memory:")]).unwrap();
        let db = Arc::new(connect_and_migrate(&settings.database).await.unwrap());
        let user_repo: Arc<dyn UserRepository> = Arc::new(UserRepositoryImpl::new(db));

        let session = AuthUseCase::new(user_repo.clone(), settings.auth.clone())
            .register(RegisterRequestDto {
                username: "ada".into(),
                email: "ada@example.edu".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                university: "UCL".into(),
                password: "correct horse".into(),
                confirm_password: "correct horse".into(),
            })
            .await
            .unwrap();

        let state = AuthState {
            user_repo,
            settings: settings.auth,
        };
        let app = Router::new()
            .route("/v1/me", get(whoami))
            .layer(middleware::from_fn_with_state(state, auth_middleware));
        (app, session.token)
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; grantsmith_session=cookie-token"));
        assert_eq!(
            session_token(&headers, "grantsmith_session").as_deref(),
            Some("cookie-token")
        );

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(
            session_token(&headers, "grantsmith_session").as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("grantsmith_session="));
        assert!(session_token(&headers, "grantsmith_session").is_none());
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (app, token) = setup_app().await;
        let req = Request::builder()
            .uri("/v1/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ada");
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let (app, token) = setup_app().await;
        let req = Request::builder()
            .uri("/v1/me")
            .header(header::COOKIE, format!("grantsmith_session={}", token))
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let (app, _) = setup_app().await;
        let req = Request::builder().uri("/v1/me").body(Body::empty()).unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_browser_is_redirected_to_login() {
        let (app, _) = setup_app().await;
        let req = Request::builder()
            .uri("/v1/me?tab=1")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/v1/auth/login?next=%2Fv1%2Fme%3Ftab%3D1"
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let (app, _) = setup_app().await;
        let req = Request::builder()
            .uri("/v1/me")
            .header(header::AUTHORIZATION, "Bearer not-a-session")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
