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

use crate::domain::models::analytics::{AnalyticsAction, AnalyticsEvent};
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::analytics_event;
use async_trait::async_trait;
use sea_orm::{sea_query::Expr, *};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// 统计仓库实现
pub struct AnalyticsRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ActionCount {
    action: String,
    total: i64,
}

#[async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), RepositoryError> {
        analytics_event::ActiveModel {
            id: Set(event.id),
            user_id: Set(event.user_id),
            action: Set(event.action.to_string()),
            proposal_id: Set(event.proposal_id),
            metadata: Set(event.metadata.clone()),
            execution_time: Set(event.execution_time),
            created_at: Set(event.created_at.into()),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(())
    }

    async fn action_counts(&self, user_id: Uuid) -> Result<BTreeMap<String, usize>, RepositoryError> {
        let rows = analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::Action)
            .column_as(Expr::col(analytics_event::Column::Id).count(), "total")
            .filter(analytics_event::Column::UserId.eq(user_id))
            .group_by(analytics_event::Column::Action)
            .into_model::<ActionCount>()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.action, row.total.max(0) as usize))
            .collect())
    }

    async fn recent(&self, user_id: Uuid, limit: u64) -> Result<Vec<AnalyticsEvent>, RepositoryError> {
        let models = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .order_by_desc(analytics_event::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        models
            .into_iter()
            .map(|m| {
                let action = m
                    .action
                    .parse::<AnalyticsAction>()
                    .map_err(RepositoryError::Corrupted)?;
                Ok(AnalyticsEvent {
                    id: m.id,
                    user_id: m.user_id,
                    action,
                    proposal_id: m.proposal_id,
                    metadata: m.metadata,
                    execution_time: m.execution_time,
                    created_at: m.created_at.into(),
                })
            })
            .collect()
    }
}
