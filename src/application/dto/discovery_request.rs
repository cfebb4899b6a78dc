// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::funding_call::FundingCall;

#[derive(Debug, Default, Deserialize)]
pub struct DiscoverCallsQuery {
    pub funding_body: Option<String>,
    pub research_area: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CallRequirementsDto {
    #[validate(url(message = "A valid call URL is required"))]
    pub url: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DynamicStructureQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Funding body required"))]
    pub funding_body: String,
    #[serde(default)]
    pub research_area: String,
}

#[derive(Debug, Serialize)]
pub struct DiscoveredCallsDto {
    pub success: bool,
    pub count: usize,
    pub calls: Vec<FundingCall>,
}
