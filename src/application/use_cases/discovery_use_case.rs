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

use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::application::dto::discovery_request::{
    CallRequirementsDto, DiscoverCallsQuery, DiscoveredCallsDto, DynamicStructureQuery,
};
use crate::domain::models::funding_call::{CallRequirements, DynamicStructure};
use crate::infrastructure::discovery::{DiscoveryError, FundingDiscovery};

#[derive(Error, Debug)]
pub enum DiscoveryUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// 资助机会发现
pub struct DiscoveryUseCase {
    discovery: Arc<FundingDiscovery>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DiscoveryUseCase {
    pub fn new(discovery: Arc<FundingDiscovery>) -> Self {
        Self { discovery }
    }

    pub async fn discover_calls(&self, query: DiscoverCallsQuery) -> DiscoveredCallsDto {
        let calls = self
            .discovery
            .discover_open_calls(non_empty(&query.funding_body), non_empty(&query.research_area))
            .await;

        DiscoveredCallsDto {
            success: true,
            count: calls.len(),
            calls,
        }
    }

    pub async fn call_requirements(
        &self,
        dto: CallRequirementsDto,
    ) -> Result<CallRequirements, DiscoveryUseCaseError> {
        dto.validate()
            .map_err(|_| DiscoveryUseCaseError::ValidationError("A valid call URL is required".to_string()))?;
        Ok(self.discovery.extract_call_requirements(&dto.url).await?)
    }

    pub async fn dynamic_structure(
        &self,
        query: DynamicStructureQuery,
    ) -> Result<DynamicStructure, DiscoveryUseCaseError> {
        if query.validate().is_err() || query.funding_body.trim().is_empty() {
            return Err(DiscoveryUseCaseError::ValidationError(
                "Funding body required".to_string(),
            ));
        }

        Ok(self
            .discovery
            .create_dynamic_structure(query.funding_body.trim(), query.research_area.trim())
            .await)
    }
}
