// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] DbErr),

    #[error("未找到数据")]
    NotFound,

    #[error("数据已存在: {0}")]
    AlreadyExists(String),

    #[error("数据损坏: {0}")]
    Corrupted(String),
}

impl RepositoryError {
    /// 将唯一约束冲突识别为 `AlreadyExists`
    pub fn from_insert(err: DbErr, what: &str) -> Self {
        let message = err.to_string().to_lowercase();
        if message.contains("unique") || message.contains("duplicate") {
            RepositoryError::AlreadyExists(what.to_string())
        } else {
            RepositoryError::Database(err)
        }
    }
}
