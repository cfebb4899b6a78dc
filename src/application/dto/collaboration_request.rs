// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::collaboration::CollaboratorRole;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AddCollaboratorDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    pub role: CollaboratorRole,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AddCommentDto {
    #[serde(default)]
    pub content: String,
    pub section_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResolveCommentDto {
    #[serde(default = "default_resolved")]
    pub resolved: bool,
}

impl Default for ResolveCommentDto {
    fn default() -> Self {
        Self { resolved: true }
    }
}

fn default_resolved() -> bool {
    true
}
