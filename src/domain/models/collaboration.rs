// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 协作者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorRole {
    #[default]
    Viewer,
    Editor,
}

impl fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorRole::Viewer => write!(f, "viewer"),
            CollaboratorRole::Editor => write!(f, "editor"),
        }
    }
}

impl FromStr for CollaboratorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(CollaboratorRole::Viewer),
            "editor" => Ok(CollaboratorRole::Editor),
            other => Err(format!("Invalid collaborator role: {}", other)),
        }
    }
}

/// 提案协作者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub user_id: Uuid,
    /// 展示用，查询时补齐
    #[serde(default)]
    pub username: String,
    pub role: CollaboratorRole,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// 提案评论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub section_id: Option<Uuid>,
    pub user_id: Uuid,
    #[serde(default)]
    pub username: String,
    pub content: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
