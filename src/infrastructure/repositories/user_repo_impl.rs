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

use crate::domain::models::user::{ProfileCounters, Session, User, UserProfile};
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{session, user, user_profile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

/// 用户仓库实现
pub struct UserRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl UserRepositoryImpl {
    /// 创建新的用户仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_user(m: user::Model) -> User {
    User {
        id: m.id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        is_active: m.is_active,
        created_at: m.created_at.into(),
        last_login_at: m.last_login_at.map(Into::into),
    }
}

fn to_profile(m: user_profile::Model) -> UserProfile {
    UserProfile {
        user_id: m.user_id,
        first_name: m.first_name,
        last_name: m.last_name,
        university: m.university,
        total_proposals_generated: m.total_proposals_generated,
        total_proposals_saved: m.total_proposals_saved,
        total_words_generated: m.total_words_generated,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, new_user: &User, profile: &UserProfile) -> Result<User, RepositoryError> {
        let txn = self.db.begin().await?;

        let user_model = user::ActiveModel {
            id: Set(new_user.id),
            username: Set(new_user.username.clone()),
            email: Set(new_user.email.to_lowercase()),
            password_hash: Set(new_user.password_hash.clone()),
            is_active: Set(new_user.is_active),
            created_at: Set(new_user.created_at.into()),
            last_login_at: Set(new_user.last_login_at.map(Into::into)),
        };
        user_model
            .insert(&txn)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "user"))?;

        let profile_model = user_profile::ActiveModel {
            user_id: Set(new_user.id),
            first_name: Set(profile.first_name.clone()),
            last_name: Set(profile.last_name.clone()),
            university: Set(profile.university.clone()),
            total_proposals_generated: Set(profile.total_proposals_generated),
            total_proposals_saved: Set(profile.total_proposals_saved),
            total_words_generated: Set(profile.total_words_generated),
            created_at: Set(profile.created_at.into()),
            updated_at: Set(profile.updated_at.into()),
        };
        profile_model.insert(&txn).await?;

        txn.commit().await?;

        let mut created = new_user.clone();
        created.email = new_user.email.to_lowercase();
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let model = user::Entity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(model.map(to_user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(to_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(to_user))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        user::Entity::update_many()
            .col_expr(
                user::Column::LastLoginAt,
                Expr::value(Some(sea_orm::prelude::DateTimeWithTimeZone::from(at))),
            )
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, RepositoryError> {
        let model = user_profile::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(to_profile))
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut model: user_profile::ActiveModel = user_profile::Entity::find_by_id(profile.user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        model.first_name = Set(profile.first_name.clone());
        model.last_name = Set(profile.last_name.clone());
        model.university = Set(profile.university.clone());
        model.updated_at = Set(Utc::now().into());

        let updated = model.update(self.db.as_ref()).await?;
        Ok(to_profile(updated))
    }

    async fn increment_counters(
        &self,
        user_id: Uuid,
        counters: ProfileCounters,
    ) -> Result<(), RepositoryError> {
        user_profile::Entity::update_many()
            .col_expr(
                user_profile::Column::TotalProposalsGenerated,
                Expr::col(user_profile::Column::TotalProposalsGenerated)
                    .add(counters.proposals_generated),
            )
            .col_expr(
                user_profile::Column::TotalProposalsSaved,
                Expr::col(user_profile::Column::TotalProposalsSaved).add(counters.proposals_saved),
            )
            .col_expr(
                user_profile::Column::TotalWordsGenerated,
                Expr::col(user_profile::Column::TotalWordsGenerated).add(counters.words_generated),
            )
            .filter(user_profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn create_session(&self, new_session: &Session) -> Result<(), RepositoryError> {
        let model = session::ActiveModel {
            token_hash: Set(new_session.token_hash.clone()),
            user_id: Set(new_session.user_id),
            created_at: Set(new_session.created_at.into()),
            expires_at: Set(new_session.expires_at.into()),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, RepositoryError> {
        let model = session::Entity::find_by_id(token_hash.to_string())
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(|m| Session {
            token_hash: m.token_hash,
            user_id: m.user_id,
            created_at: m.created_at.into(),
            expires_at: m.expires_at.into(),
        }))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepositoryError> {
        session::Entity::delete_by_id(token_hash.to_string())
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = now.into();
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
