// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// argon2 PHC 字符串，不对外序列化
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// 用户资料及使用统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
    pub total_proposals_generated: i32,
    pub total_proposals_saved: i32,
    pub total_words_generated: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: Uuid, first_name: &str, last_name: &str, university: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            university: university.to_string(),
            total_proposals_generated: 0,
            total_proposals_saved: 0,
            total_words_generated: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 登录会话
///
/// 数据库只保存令牌的 SHA-256 摘要
#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// 资料统计增量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileCounters {
    pub proposals_generated: i32,
    pub proposals_saved: i32,
    pub words_generated: i64,
}
