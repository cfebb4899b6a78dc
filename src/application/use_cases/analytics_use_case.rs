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

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::application::dto::proposal_request::DashboardDto;
use crate::domain::models::analytics::AnalyticsSummary;
use crate::domain::models::proposal::ProposalFilter;
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;

const RECENT_EVENTS: u64 = 20;
const DASHBOARD_RECENT_PROPOSALS: usize = 5;
const CUSTOM_TYPE_NAME: &str = "Custom";

#[derive(Error, Debug)]
pub enum AnalyticsUseCaseError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 使用统计与仪表盘
pub struct AnalyticsUseCase<P: ?Sized, T: ?Sized, U: ?Sized, A: ?Sized> {
    proposal_repo: Arc<P>,
    type_repo: Arc<T>,
    user_repo: Arc<U>,
    analytics_repo: Arc<A>,
}

impl<P, T, U, A> AnalyticsUseCase<P, T, U, A>
where
    P: ProposalRepository + ?Sized + 'static,
    T: ProposalTypeRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
    A: AnalyticsRepository + ?Sized + 'static,
{
    pub fn new(
        proposal_repo: Arc<P>,
        type_repo: Arc<T>,
        user_repo: Arc<U>,
        analytics_repo: Arc<A>,
    ) -> Self {
        Self {
            proposal_repo,
            type_repo,
            user_repo,
            analytics_repo,
        }
    }

    /// 用户统计摘要：按最新版本汇总提案，附带行为计数与最近事件
    pub async fn summary(&self, user_id: Uuid) -> Result<AnalyticsSummary, AnalyticsUseCaseError> {
        let proposals = self
            .proposal_repo
            .list_latest_for_user(user_id, &ProposalFilter::default())
            .await?;

        let mut type_names: HashMap<Uuid, String> = HashMap::new();
        let mut proposals_by_type: BTreeMap<String, usize> = BTreeMap::new();
        for proposal in &proposals {
            let name = match proposal.proposal_type_id {
                Some(type_id) => match type_names.get(&type_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self
                            .type_repo
                            .find_by_id(type_id)
                            .await?
                            .map(|t| t.name)
                            .unwrap_or_else(|| CUSTOM_TYPE_NAME.to_string());
                        type_names.insert(type_id, name.clone());
                        name
                    }
                },
                None => CUSTOM_TYPE_NAME.to_string(),
            };
            *proposals_by_type.entry(name).or_insert(0) += 1;
        }

        Ok(AnalyticsSummary {
            total_proposals: proposals.len(),
            total_words: proposals.iter().map(|p| p.word_count as i64).sum(),
            total_citations: proposals.iter().map(|p| p.citation_count as i64).sum(),
            proposals_by_type,
            action_counts: self.analytics_repo.action_counts(user_id).await?,
            recent_events: self.analytics_repo.recent(user_id, RECENT_EVENTS).await?,
        })
    }

    /// 仪表盘：可用提案类型、最近的提案与累计统计
    pub async fn dashboard(&self, user_id: Uuid) -> Result<DashboardDto, AnalyticsUseCaseError> {
        let proposal_types = self.type_repo.list_active().await?;
        let proposals = self
            .proposal_repo
            .list_latest_for_user(user_id, &ProposalFilter::default())
            .await?;
        let total_proposals = proposals.len();
        let total_words = proposals.iter().map(|p| p.word_count as i64).sum();

        Ok(DashboardDto {
            proposal_types,
            recent_proposals: proposals
                .into_iter()
                .take(DASHBOARD_RECENT_PROPOSALS)
                .collect(),
            total_proposals,
            total_words,
            profile: self.user_repo.get_profile(user_id).await?,
        })
    }
}
