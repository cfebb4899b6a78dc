// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::analytics::AnalyticsEvent;
use async_trait::async_trait;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 统计仓库特质
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), RepositoryError>;

    /// 各行为类型的事件数量
    async fn action_counts(&self, user_id: Uuid) -> Result<BTreeMap<String, usize>, RepositoryError>;

    /// 最近的事件，按时间倒序
    async fn recent(&self, user_id: Uuid, limit: u64) -> Result<Vec<AnalyticsEvent>, RepositoryError>;
}
