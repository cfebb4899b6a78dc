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

use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::auth_request::{
    AuthSessionDto, LoginRequestDto, RegisterRequestDto, UpdateProfileDto,
};
use crate::config::settings::AuthSettings;
use crate::domain::models::user::{Session, User, UserProfile};
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credentials;

#[derive(Error, Debug)]
pub enum AuthUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<argon2::password_hash::Error> for AuthUseCaseError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthUseCaseError::PasswordHash(err.to_string())
    }
}

/// 账户用例：注册、登录、会话与个人资料
pub struct AuthUseCase<U: ?Sized> {
    user_repo: Arc<U>,
    settings: AuthSettings,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + ?Sized + 'static,
{
    pub fn new(user_repo: Arc<U>, settings: AuthSettings) -> Self {
        Self {
            user_repo,
            settings,
        }
    }

    /// 注册新用户并直接登录
    pub async fn register(
        &self,
        dto: RegisterRequestDto,
    ) -> Result<AuthSessionDto, AuthUseCaseError> {
        let dto = dto.trimmed();

        if dto.has_empty_field() {
            return Err(AuthUseCaseError::ValidationError(
                "All fields are required.".to_string(),
            ));
        }
        if dto.password != dto.confirm_password {
            return Err(AuthUseCaseError::ValidationError(
                "Passwords do not match.".to_string(),
            ));
        }
        credentials::validate_password_strength(&dto.password, self.settings.min_password_length)
            .map_err(AuthUseCaseError::ValidationError)?;
        dto.validate()
            .map_err(|_| AuthUseCaseError::ValidationError("Enter a valid email address.".to_string()))?;

        if self.user_repo.find_by_username(&dto.username).await?.is_some() {
            return Err(AuthUseCaseError::Conflict(
                "Username already exists.".to_string(),
            ));
        }
        if self.user_repo.find_by_email(&dto.email).await?.is_some() {
            return Err(AuthUseCaseError::Conflict(
                "Email already registered.".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: dto.username.clone(),
            email: dto.email.clone(),
            password_hash: credentials::hash_password(&dto.password)?,
            is_active: true,
            created_at: now,
            last_login_at: Some(now),
        };
        let profile = UserProfile::new(user.id, &dto.first_name, &dto.last_name, &dto.university);

        let user = match self.user_repo.create(&user, &profile).await {
            Ok(user) => user,
            // Lost a race against a concurrent registration
            Err(RepositoryError::AlreadyExists(_)) => {
                return Err(AuthUseCaseError::Conflict(
                    "Username already exists.".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        info!("Registered user {}", user.username);

        self.open_session(user, profile).await
    }

    /// 校验用户名和密码并创建会话
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthSessionDto, AuthUseCaseError> {
        let username = dto.username.trim();
        if username.is_empty() || dto.password.is_empty() {
            return Err(AuthUseCaseError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthUseCaseError::InvalidCredentials)?;

        if !credentials::verify_password(&dto.password, &user.password_hash)? {
            debug!("Password mismatch for {}", username);
            return Err(AuthUseCaseError::InvalidCredentials);
        }

        let now = Utc::now();
        self.user_repo.touch_last_login(user.id, now).await?;
        let user = User {
            last_login_at: Some(now),
            ..user
        };

        let profile = match self.user_repo.get_profile(user.id).await? {
            Some(profile) => profile,
            None => UserProfile::new(user.id, "", "", ""),
        };

        self.open_session(user, profile).await
    }

    pub async fn logout(&self, token_hash: &str) -> Result<(), AuthUseCaseError> {
        self.user_repo.delete_session(token_hash).await?;
        Ok(())
    }

    /// 由明文令牌解析当前用户
    ///
    /// 会话不存在、已过期或用户已停用时返回 `Ok(None)`；过期会话顺带删除
    pub async fn authenticate(&self, token: &str) -> Result<Option<(User, String)>, AuthUseCaseError> {
        let token_hash = credentials::hash_token(token);
        let Some(session) = self.user_repo.find_session(&token_hash).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.user_repo.delete_session(&token_hash).await?;
            return Ok(None);
        }

        Ok(self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .filter(|u| u.is_active)
            .map(|u| (u, token_hash)))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AuthUseCaseError> {
        self.user_repo
            .get_profile(user_id)
            .await?
            .ok_or(AuthUseCaseError::ProfileNotFound)
    }

    /// 更新个人资料，只修改提供的字段
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserProfile, AuthUseCaseError> {
        dto.validate()
            .map_err(|e| AuthUseCaseError::ValidationError(e.to_string()))?;

        let mut profile = self.get_profile(user_id).await?;
        if let Some(first_name) = dto.first_name {
            profile.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = dto.last_name {
            profile.last_name = last_name.trim().to_string();
        }
        if let Some(university) = dto.university {
            profile.university = university.trim().to_string();
        }
        profile.updated_at = Utc::now();

        Ok(self.user_repo.update_profile(&profile).await?)
    }

    /// 清理过期会话
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthUseCaseError> {
        Ok(self.user_repo.delete_expired_sessions(Utc::now()).await?)
    }

    async fn open_session(
        &self,
        user: User,
        profile: UserProfile,
    ) -> Result<AuthSessionDto, AuthUseCaseError> {
        let (token, token_hash) = credentials::generate_session_token();
        let now = Utc::now();
        let session = Session {
            token_hash,
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(self.settings.session_ttl_hours),
        };
        self.user_repo.create_session(&session).await?;

        Ok(AuthSessionDto {
            token,
            expires_at: session.expires_at,
            user,
            profile,
        })
    }
}
