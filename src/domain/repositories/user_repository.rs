// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::user::{ProfileCounters, Session, User, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 用户仓库特质
///
/// 管理账号、用户资料与登录会话
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户及其资料
    ///
    /// # 返回值
    ///
    /// * `Ok(User)` - 创建成功
    /// * `Err(RepositoryError::AlreadyExists)` - 用户名或邮箱已被占用
    async fn create(&self, user: &User, profile: &UserProfile) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// 按用户名查找（精确匹配）
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// 按邮箱查找（不区分大小写）
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// 记录最近登录时间
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, RepositoryError>;

    async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, RepositoryError>;

    /// 原子地累加资料中的统计计数
    async fn increment_counters(
        &self,
        user_id: Uuid,
        counters: ProfileCounters,
    ) -> Result<(), RepositoryError>;

    async fn create_session(&self, session: &Session) -> Result<(), RepositoryError>;

    /// 按令牌摘要查找会话，不检查过期
    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, RepositoryError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepositoryError>;

    /// 删除已过期会话，返回删除数量
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
