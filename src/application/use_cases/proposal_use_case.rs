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

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::proposal_request::{
    AccessLevel, ProposalDetailDto, ProposalListQuery, SaveProposalDto, UpdateProposalDto,
};
use crate::application::use_cases::access;
use crate::domain::models::analytics::{AnalyticsAction, AnalyticsEvent};
use crate::domain::models::proposal::{
    ProposalFilter, ProposalSection, ProposalStatus, ProposalVersionSummary, SavedProposal,
};
use crate::domain::models::user::ProfileCounters;
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;
use crate::utils::text_processing::{count_words, estimate_pages};

#[derive(Error, Debug)]
pub enum ProposalUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Proposal not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 正文的统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStats {
    pub word_count: i32,
    pub citation_count: i32,
    pub page_count: i32,
}

impl ContentStats {
    /// 单词按空白切分（先去除 HTML 标签），引用数为 `[` 的个数，每 400 词一页
    pub fn of(content: &str) -> Self {
        let words = count_words(content);
        Self {
            word_count: words as i32,
            citation_count: content.matches('[').count() as i32,
            page_count: estimate_pages(words) as i32,
        }
    }
}

/// 按二级 Markdown 标题切分正文
///
/// 第一个 `## ` 标题之前的内容（标题块、元信息）不计入章节
pub fn split_markdown_sections(content: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join("\n").trim().to_string()));
            }
            current = Some((heading.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            if line.trim() != "---" {
                body.push(line);
            }
        }
    }
    if let Some((name, body)) = current {
        sections.push((name, body.join("\n").trim().to_string()));
    }

    sections
}

/// 由正文切分出章节行
///
/// 与 `previous` 中同名的章节沿用原 ID，章节上的评论因此保持关联
fn build_sections(
    proposal_id: Uuid,
    content: &str,
    previous: &[ProposalSection],
    now: DateTime<Utc>,
) -> Vec<ProposalSection> {
    let mut reusable: Vec<&ProposalSection> = previous.iter().collect();

    split_markdown_sections(content)
        .into_iter()
        .enumerate()
        .map(|(idx, (name, body))| {
            let id = reusable
                .iter()
                .position(|s| s.section_name == name)
                .map(|pos| reusable.remove(pos).id)
                .unwrap_or_else(Uuid::new_v4);
            ProposalSection {
                id,
                proposal_id,
                section_name: name,
                section_order: idx as i32 + 1,
                word_count: count_words(&body) as i32,
                content: body,
                updated_at: now,
            }
        })
        .collect()
}

fn sections_json(sections: &[ProposalSection]) -> serde_json::Value {
    sections
        .iter()
        .map(|s| json!({"name": s.section_name, "content": s.content, "word_count": s.word_count}))
        .collect()
}

fn required_fields_error() -> ProposalUseCaseError {
    ProposalUseCaseError::ValidationError("Title, description, and content are required.".to_string())
}

/// 已保存提案的管理：保存、列表、详情、编辑、删除与版本
pub struct ProposalUseCase<P: ?Sized, C: ?Sized, T: ?Sized, U: ?Sized, A: ?Sized> {
    proposal_repo: Arc<P>,
    collab_repo: Arc<C>,
    type_repo: Arc<T>,
    user_repo: Arc<U>,
    analytics_repo: Arc<A>,
}

impl<P, C, T, U, A> ProposalUseCase<P, C, T, U, A>
where
    P: ProposalRepository + ?Sized + 'static,
    C: CollaborationRepository + ?Sized + 'static,
    T: ProposalTypeRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
    A: AnalyticsRepository + ?Sized + 'static,
{
    pub fn new(
        proposal_repo: Arc<P>,
        collab_repo: Arc<C>,
        type_repo: Arc<T>,
        user_repo: Arc<U>,
        analytics_repo: Arc<A>,
    ) -> Self {
        Self {
            proposal_repo,
            collab_repo,
            type_repo,
            user_repo,
            analytics_repo,
        }
    }

    /// 保存手工编写或外部生成的提案
    pub async fn save(
        &self,
        user_id: Uuid,
        dto: SaveProposalDto,
    ) -> Result<SavedProposal, ProposalUseCaseError> {
        dto.validate()
            .map_err(|e| ProposalUseCaseError::ValidationError(e.to_string()))?;

        let title = dto.title.trim();
        let description = dto.description.trim();
        let content = dto.content.trim();
        if title.is_empty() || description.is_empty() || content.is_empty() {
            return Err(required_fields_error());
        }

        if let Some(type_id) = dto.proposal_type_id {
            if self.type_repo.find_by_id(type_id).await?.is_none() {
                return Err(ProposalUseCaseError::ValidationError(
                    "Invalid proposal type".to_string(),
                ));
            }
        }

        let keywords = dto.keywords.as_deref().map(str::trim).unwrap_or_default();
        let stats = ContentStats::of(content);
        let now = Utc::now();
        let id = Uuid::new_v4();

        let sections = build_sections(id, content, &[], now);

        let proposal = SavedProposal {
            id,
            user_id,
            proposal_type_id: dto.proposal_type_id,
            title: title.to_string(),
            keywords: keywords.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            content_json: json!({ "sections": sections_json(&sections), "keywords": keywords }),
            retrieved_papers: json!([]),
            citations_data: json!({}),
            word_count: stats.word_count,
            citation_count: stats.citation_count,
            page_count: stats.page_count,
            status: ProposalStatus::Draft,
            version: 1,
            is_latest: true,
            root_id: id,
            created_at: now,
            updated_at: now,
        };

        let proposal = self.proposal_repo.create(&proposal, &sections).await?;
        self.user_repo
            .increment_counters(
                user_id,
                ProfileCounters {
                    proposals_saved: 1,
                    ..Default::default()
                },
            )
            .await?;
        self.track(user_id, AnalyticsAction::Save, Some(proposal.id), json!({"title": proposal.title}))
            .await;

        info!("Saved proposal {} for user {}", proposal.id, user_id);
        Ok(proposal)
    }

    /// 用户自己的最新版本提案，最新的在前
    pub async fn list(
        &self,
        user_id: Uuid,
        query: ProposalListQuery,
    ) -> Result<Vec<SavedProposal>, ProposalUseCaseError> {
        let filter = ProposalFilter {
            status: query.status,
            proposal_type_id: query.proposal_type_id,
        };
        Ok(self.proposal_repo.list_latest_for_user(user_id, &filter).await?)
    }

    /// 用户作为协作者参与的提案
    pub async fn list_shared(&self, user_id: Uuid) -> Result<Vec<SavedProposal>, ProposalUseCaseError> {
        let ids = self.collab_repo.proposal_ids_for_user(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.proposal_repo.list_latest_by_ids(&ids).await?)
    }

    /// 提案详情，记录一次浏览
    pub async fn get(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<ProposalDetailDto, ProposalUseCaseError> {
        let (proposal, access) = self.load(user_id, proposal_id).await?;

        let sections = self.proposal_repo.sections(proposal.id).await?;
        let versions = self
            .proposal_repo
            .versions(proposal.root_id)
            .await?
            .iter()
            .map(ProposalVersionSummary::from)
            .collect();
        let collaborators = self.collab_repo.list_collaborators(proposal.id).await?;
        let proposal_type = match proposal.proposal_type_id {
            Some(type_id) => self.type_repo.find_by_id(type_id).await?,
            None => None,
        };

        self.track(user_id, AnalyticsAction::View, Some(proposal.id), json!({}))
            .await;

        Ok(ProposalDetailDto {
            proposal,
            proposal_type,
            sections,
            versions,
            collaborators,
            access,
        })
    }

    /// 更新提案，所有者或编辑者可用
    pub async fn update(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
        dto: UpdateProposalDto,
    ) -> Result<SavedProposal, ProposalUseCaseError> {
        dto.validate()
            .map_err(|e| ProposalUseCaseError::ValidationError(e.to_string()))?;

        let (mut proposal, access) = self.load(user_id, proposal_id).await?;
        if !access.can_edit() {
            return Err(ProposalUseCaseError::Forbidden(
                "You do not have permission to edit this proposal".to_string(),
            ));
        }

        let mut changed = Vec::new();
        if let Some(title) = dto.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(required_fields_error());
            }
            proposal.title = title.to_string();
            changed.push("title");
        }
        if let Some(keywords) = dto.keywords {
            proposal.keywords = keywords.trim().to_string();
            changed.push("keywords");
        }
        if let Some(description) = dto.description {
            let description = description.trim();
            if description.is_empty() {
                return Err(required_fields_error());
            }
            proposal.description = description.to_string();
            changed.push("description");
        }
        if let Some(status) = dto.status {
            proposal.status = status;
            changed.push("status");
        }
        let now = Utc::now();
        proposal.updated_at = now;

        let proposal = match dto.content {
            Some(content) => {
                let content = content.trim();
                if content.is_empty() {
                    return Err(required_fields_error());
                }
                changed.push("content");

                let stats = ContentStats::of(content);
                proposal.content = content.to_string();
                proposal.word_count = stats.word_count;
                proposal.citation_count = stats.citation_count;
                proposal.page_count = stats.page_count;

                let previous = self.proposal_repo.sections(proposal.id).await?;
                let sections = build_sections(proposal.id, content, &previous, now);
                let section_values = sections_json(&sections);
                if let Some(doc) = proposal.content_json.as_object_mut() {
                    doc.insert("sections".to_string(), section_values);
                } else {
                    proposal.content_json = json!({ "sections": section_values });
                }

                self.proposal_repo
                    .update_with_sections(&proposal, &sections)
                    .await?
            }
            None => self.proposal_repo.update(&proposal).await?,
        };

        self.track(
            user_id,
            AnalyticsAction::Edit,
            Some(proposal.id),
            json!({ "fields": changed }),
        )
        .await;

        Ok(proposal)
    }

    /// 删除提案，仅所有者可用
    pub async fn delete(&self, user_id: Uuid, proposal_id: Uuid) -> Result<(), ProposalUseCaseError> {
        let (proposal, access) = self.load(user_id, proposal_id).await?;
        if !access.is_owner() {
            return Err(ProposalUseCaseError::Forbidden(
                "Only the proposal owner can delete it".to_string(),
            ));
        }

        self.proposal_repo.delete(proposal.id).await?;
        self.track(
            user_id,
            AnalyticsAction::Delete,
            Some(proposal.id),
            json!({ "title": proposal.title, "version": proposal.version }),
        )
        .await;

        info!("Deleted proposal {}", proposal.id);
        Ok(())
    }

    /// 同一版本链的全部版本
    pub async fn versions(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Vec<ProposalVersionSummary>, ProposalUseCaseError> {
        let (proposal, _) = self.load(user_id, proposal_id).await?;
        Ok(self
            .proposal_repo
            .versions(proposal.root_id)
            .await?
            .iter()
            .map(ProposalVersionSummary::from)
            .collect())
    }

    /// 以版本链中的最新版本为基础创建新版本，仅所有者可用
    pub async fn new_version(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<SavedProposal, ProposalUseCaseError> {
        let (proposal, access) = self.load(user_id, proposal_id).await?;
        if !access.is_owner() {
            return Err(ProposalUseCaseError::Forbidden(
                "Only the proposal owner can create versions".to_string(),
            ));
        }

        let latest = self
            .proposal_repo
            .versions(proposal.root_id)
            .await?
            .into_iter()
            .find(|p| p.is_latest)
            .unwrap_or(proposal);

        let now = Utc::now();
        let next = SavedProposal {
            id: Uuid::new_v4(),
            version: latest.version + 1,
            is_latest: true,
            created_at: now,
            updated_at: now,
            ..latest.clone()
        };
        let sections: Vec<ProposalSection> = self
            .proposal_repo
            .sections(latest.id)
            .await?
            .into_iter()
            .map(|s| ProposalSection {
                id: Uuid::new_v4(),
                proposal_id: next.id,
                updated_at: now,
                ..s
            })
            .collect();

        let created = self
            .proposal_repo
            .create_version(latest.id, &next, &sections)
            .await?;
        self.collab_repo.copy_collaborators(latest.id, created.id).await?;

        info!(
            "Created version {} of proposal {}",
            created.version, created.root_id
        );
        Ok(created)
    }

    async fn load(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<(SavedProposal, AccessLevel), ProposalUseCaseError> {
        access::load_accessible(
            self.proposal_repo.as_ref(),
            self.collab_repo.as_ref(),
            proposal_id,
            user_id,
        )
        .await?
        .ok_or(ProposalUseCaseError::NotFound)
    }

    async fn track(
        &self,
        user_id: Uuid,
        action: AnalyticsAction,
        proposal_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) {
        let event = AnalyticsEvent::new(user_id, action, proposal_id, metadata);
        if let Err(e) = self.analytics_repo.record(&event).await {
            warn!("Failed to record {} event: {}", action, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_stats() {
        let content = "<p>One two</p> three [1] four [2, 3]";
        let stats = ContentStats::of(content);
        assert_eq!(stats.word_count, 7);
        assert_eq!(stats.citation_count, 2);
        assert_eq!(stats.page_count, 1);

        let long = "word ".repeat(801);
        assert_eq!(ContentStats::of(&long).page_count, 3);
    }

    #[test]
    fn test_split_markdown_sections() {
        let content = "# Title\n\n**Keywords:** x\n\n---\n\n## Introduction\n\nFirst para.\n\n---\n\n## Methods\nSecond.\n";
        let sections = split_markdown_sections(content);
        assert_eq!(
            sections,
            vec![
                ("Introduction".to_string(), "First para.".to_string()),
                ("Methods".to_string(), "Second.".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_without_headings_is_empty() {
        assert!(split_markdown_sections("plain text only").is_empty());
    }

    #[test]
    fn test_build_sections_reuses_ids_by_name() {
        let proposal_id = Uuid::new_v4();
        let now = Utc::now();
        let previous = build_sections(
            proposal_id,
            "## Introduction\n\nOld intro.\n\n## Methods\n\nOld methods.",
            &[],
            now,
        );

        let rebuilt = build_sections(
            proposal_id,
            "## Methods\n\nNew methods text.\n\n## Impact\n\nBrand new.",
            &previous,
            now,
        );

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].id, previous[1].id);
        assert_eq!(rebuilt[0].section_order, 1);
        assert_eq!(rebuilt[0].content, "New methods text.");
        assert_eq!(rebuilt[0].word_count, 3);
        assert!(previous.iter().all(|p| p.id != rebuilt[1].id));
    }
}
