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

use axum::http::StatusCode;
use serde_json::Value;

use super::helpers::create_test_app;

/// 健康检查测试
///
/// 验证健康检查端点无需登录即可访问
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/version").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

/// 未登录访问受保护端点返回 401 与登录地址
#[tokio::test]
async fn protected_endpoint_returns_401_without_session() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/proposals").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["login_url"], "/v1/auth/login");
}

#[tokio::test]
async fn browser_request_is_redirected_to_login() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/v1/dashboard")
        .add_header("Accept", "text/html")
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let location = response.header("location");
    assert_eq!(
        location.to_str().unwrap(),
        "/v1/auth/login?next=%2Fv1%2Fdashboard"
    );
}
