// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 用户行为类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsAction {
    Generate,
    Save,
    View,
    Delete,
    Download,
    Edit,
}

impl fmt::Display for AnalyticsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalyticsAction::Generate => "generate",
            AnalyticsAction::Save => "save",
            AnalyticsAction::View => "view",
            AnalyticsAction::Delete => "delete",
            AnalyticsAction::Download => "download",
            AnalyticsAction::Edit => "edit",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AnalyticsAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(AnalyticsAction::Generate),
            "save" => Ok(AnalyticsAction::Save),
            "view" => Ok(AnalyticsAction::View),
            "delete" => Ok(AnalyticsAction::Delete),
            "download" => Ok(AnalyticsAction::Download),
            "edit" => Ok(AnalyticsAction::Edit),
            other => Err(format!("Invalid analytics action: {}", other)),
        }
    }
}

/// 行为事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: AnalyticsAction,
    pub proposal_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    /// 执行耗时（秒）
    pub execution_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(
        user_id: Uuid,
        action: AnalyticsAction,
        proposal_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action,
            proposal_id,
            metadata,
            execution_time: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_execution_time(mut self, seconds: f64) -> Self {
        self.execution_time = Some(seconds);
        self
    }
}

/// 用户统计概览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_proposals: usize,
    pub total_words: i64,
    pub total_citations: i64,
    /// 提案类型名称到数量，未指定类型记为 `Custom`
    pub proposals_by_type: BTreeMap<String, usize>,
    pub action_counts: BTreeMap<String, usize>,
    pub recent_events: Vec<AnalyticsEvent>,
}
