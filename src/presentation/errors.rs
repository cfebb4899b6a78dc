// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::services::llm_service::LlmError;
use crate::utils::errors::RepositoryError;

/// 将 `(状态码, 消息)` 渲染为 `{"error": 消息}` 响应
pub fn error_response(err: impl Into<(StatusCode, String)>) -> Response {
    let (status, msg): (StatusCode, String) = err.into();
    (status, Json(json!({ "error": msg }))).into_response()
}

/// 仓库错误映射为 HTTP 错误
///
/// 数据库细节只写入日志，不返回给客户端
impl From<RepositoryError> for (StatusCode, String) {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            RepositoryError::AlreadyExists(what) => {
                (StatusCode::CONFLICT, format!("{what} already exists"))
            }
            RepositoryError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            RepositoryError::Corrupted(e) => {
                error!("Corrupted record: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

/// 大模型错误映射：未配置为 503，上游失败为 502
impl From<LlmError> for (StatusCode, String) {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LLM API key not configured".to_string(),
            ),
            other => {
                error!("LLM call failed: {}", other);
                (StatusCode::BAD_GATEWAY, format!("AI service error: {other}"))
            }
        }
    }
}
