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

use crate::domain::models::proposal::{
    ProposalFilter, ProposalSection, ProposalStatus, SavedProposal,
};
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    proposal_collaborator, proposal_comment, proposal_section, saved_proposal,
};
use async_trait::async_trait;
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

/// 提案仓库实现
pub struct ProposalRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ProposalRepositoryImpl {
    /// 创建新的提案仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_domain(m: saved_proposal::Model) -> Result<SavedProposal, RepositoryError> {
    let status = m
        .status
        .parse::<ProposalStatus>()
        .map_err(RepositoryError::Corrupted)?;

    Ok(SavedProposal {
        id: m.id,
        user_id: m.user_id,
        proposal_type_id: m.proposal_type_id,
        title: m.title,
        keywords: m.keywords,
        description: m.description,
        content: m.content,
        content_json: m.content_json,
        retrieved_papers: m.retrieved_papers,
        citations_data: m.citations_data,
        word_count: m.word_count,
        citation_count: m.citation_count,
        page_count: m.page_count,
        status,
        version: m.version,
        is_latest: m.is_latest,
        root_id: m.root_id,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    })
}

fn to_section(m: proposal_section::Model) -> ProposalSection {
    ProposalSection {
        id: m.id,
        proposal_id: m.proposal_id,
        section_name: m.section_name,
        section_order: m.section_order,
        content: m.content,
        word_count: m.word_count,
        updated_at: m.updated_at.into(),
    }
}

fn active_from(p: &SavedProposal) -> saved_proposal::ActiveModel {
    saved_proposal::ActiveModel {
        id: Set(p.id),
        user_id: Set(p.user_id),
        proposal_type_id: Set(p.proposal_type_id),
        title: Set(p.title.clone()),
        keywords: Set(p.keywords.clone()),
        description: Set(p.description.clone()),
        content: Set(p.content.clone()),
        content_json: Set(p.content_json.clone()),
        retrieved_papers: Set(p.retrieved_papers.clone()),
        citations_data: Set(p.citations_data.clone()),
        word_count: Set(p.word_count),
        citation_count: Set(p.citation_count),
        page_count: Set(p.page_count),
        status: Set(p.status.to_string()),
        version: Set(p.version),
        is_latest: Set(p.is_latest),
        root_id: Set(p.root_id),
        created_at: Set(p.created_at.into()),
        updated_at: Set(p.updated_at.into()),
    }
}

async fn insert_sections<C: ConnectionTrait>(
    conn: &C,
    sections: &[ProposalSection],
) -> Result<(), RepositoryError> {
    for s in sections {
        proposal_section::ActiveModel {
            id: Set(s.id),
            proposal_id: Set(s.proposal_id),
            section_name: Set(s.section_name.clone()),
            section_order: Set(s.section_order),
            content: Set(s.content.clone()),
            word_count: Set(s.word_count),
            updated_at: Set(s.updated_at.into()),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn update_editable<C: ConnectionTrait>(
    conn: &C,
    proposal: &SavedProposal,
) -> Result<SavedProposal, RepositoryError> {
    let mut model: saved_proposal::ActiveModel = saved_proposal::Entity::find_by_id(proposal.id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into();

    model.title = Set(proposal.title.clone());
    model.keywords = Set(proposal.keywords.clone());
    model.description = Set(proposal.description.clone());
    model.content = Set(proposal.content.clone());
    model.content_json = Set(proposal.content_json.clone());
    model.word_count = Set(proposal.word_count);
    model.citation_count = Set(proposal.citation_count);
    model.page_count = Set(proposal.page_count);
    model.status = Set(proposal.status.to_string());
    model.updated_at = Set(proposal.updated_at.into());

    let updated = model.update(conn).await?;
    to_domain(updated)
}

#[async_trait]
impl ProposalRepository for ProposalRepositoryImpl {
    async fn create(
        &self,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError> {
        let txn = self.db.begin().await?;
        active_from(proposal).insert(&txn).await?;
        insert_sections(&txn, sections).await?;
        txn.commit().await?;
        Ok(proposal.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SavedProposal>, RepositoryError> {
        saved_proposal::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn list_latest_for_user(
        &self,
        user_id: Uuid,
        filter: &ProposalFilter,
    ) -> Result<Vec<SavedProposal>, RepositoryError> {
        let mut query = saved_proposal::Entity::find()
            .filter(saved_proposal::Column::UserId.eq(user_id))
            .filter(saved_proposal::Column::IsLatest.eq(true));

        if let Some(status) = filter.status {
            query = query.filter(saved_proposal::Column::Status.eq(status.to_string()));
        }
        if let Some(type_id) = filter.proposal_type_id {
            query = query.filter(saved_proposal::Column::ProposalTypeId.eq(type_id));
        }

        query
            .order_by_desc(saved_proposal::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list_latest_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SavedProposal>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        saved_proposal::Entity::find()
            .filter(saved_proposal::Column::Id.is_in(ids.iter().copied()))
            .filter(saved_proposal::Column::IsLatest.eq(true))
            .order_by_desc(saved_proposal::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update(&self, proposal: &SavedProposal) -> Result<SavedProposal, RepositoryError> {
        update_editable(self.db.as_ref(), proposal).await
    }

    async fn update_with_sections(
        &self,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError> {
        let txn = self.db.begin().await?;

        let updated = update_editable(&txn, proposal).await?;

        // Rows whose id survives are updated in place so comments stay attached
        proposal_section::Entity::delete_many()
            .filter(proposal_section::Column::ProposalId.eq(proposal.id))
            .filter(proposal_section::Column::Id.is_not_in(sections.iter().map(|s| s.id)))
            .exec(&txn)
            .await?;
        for s in sections {
            let existing = proposal_section::Entity::find_by_id(s.id).one(&txn).await?;
            match existing {
                Some(model) => {
                    let mut model: proposal_section::ActiveModel = model.into();
                    model.section_name = Set(s.section_name.clone());
                    model.section_order = Set(s.section_order);
                    model.content = Set(s.content.clone());
                    model.word_count = Set(s.word_count);
                    model.updated_at = Set(s.updated_at.into());
                    model.update(&txn).await?;
                }
                None => insert_sections(&txn, std::slice::from_ref(s)).await?,
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let existing = saved_proposal::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        proposal_comment::Entity::delete_many()
            .filter(proposal_comment::Column::ProposalId.eq(id))
            .exec(&txn)
            .await?;
        proposal_collaborator::Entity::delete_many()
            .filter(proposal_collaborator::Column::ProposalId.eq(id))
            .exec(&txn)
            .await?;
        proposal_section::Entity::delete_many()
            .filter(proposal_section::Column::ProposalId.eq(id))
            .exec(&txn)
            .await?;
        saved_proposal::Entity::delete_by_id(id).exec(&txn).await?;

        if existing.is_latest {
            let previous = saved_proposal::Entity::find()
                .filter(saved_proposal::Column::RootId.eq(existing.root_id))
                .order_by_desc(saved_proposal::Column::Version)
                .one(&txn)
                .await?;
            if let Some(previous) = previous {
                let mut model: saved_proposal::ActiveModel = previous.into();
                model.is_latest = Set(true);
                model.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn versions(&self, root_id: Uuid) -> Result<Vec<SavedProposal>, RepositoryError> {
        saved_proposal::Entity::find()
            .filter(saved_proposal::Column::RootId.eq(root_id))
            .order_by_desc(saved_proposal::Column::Version)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn create_version(
        &self,
        previous_id: Uuid,
        proposal: &SavedProposal,
        sections: &[ProposalSection],
    ) -> Result<SavedProposal, RepositoryError> {
        let txn = self.db.begin().await?;

        saved_proposal::Entity::update_many()
            .col_expr(saved_proposal::Column::IsLatest, Expr::value(false))
            .filter(saved_proposal::Column::RootId.eq(proposal.root_id))
            .exec(&txn)
            .await?;

        if saved_proposal::Entity::find_by_id(previous_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }

        active_from(proposal).insert(&txn).await?;
        insert_sections(&txn, sections).await?;

        txn.commit().await?;
        Ok(proposal.clone())
    }

    async fn sections(&self, proposal_id: Uuid) -> Result<Vec<ProposalSection>, RepositoryError> {
        let models = proposal_section::Entity::find()
            .filter(proposal_section::Column::ProposalId.eq(proposal_id))
            .order_by_asc(proposal_section::Column::SectionOrder)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(to_section).collect())
    }

    async fn find_section(&self, id: Uuid) -> Result<Option<ProposalSection>, RepositoryError> {
        let model = proposal_section::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(to_section))
    }

    async fn update_section(
        &self,
        section: &ProposalSection,
    ) -> Result<ProposalSection, RepositoryError> {
        let mut model: proposal_section::ActiveModel =
            proposal_section::Entity::find_by_id(section.id)
                .one(self.db.as_ref())
                .await?
                .ok_or(RepositoryError::NotFound)?
                .into();

        model.content = Set(section.content.clone());
        model.word_count = Set(section.word_count);
        model.updated_at = Set(section.updated_at.into());

        let updated = model.update(self.db.as_ref()).await?;
        Ok(to_section(updated))
    }
}
