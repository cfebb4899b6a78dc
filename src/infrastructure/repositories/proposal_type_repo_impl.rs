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

use crate::domain::models::proposal_type::{ProposalTemplate, ProposalType};
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{proposal_template, proposal_type};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 提案类型仓库实现
pub struct ProposalTypeRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProposalTypeRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn string_list(value: serde_json::Value) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_value(value).map_err(|e| RepositoryError::Corrupted(e.to_string()))
}

fn to_domain(m: proposal_type::Model) -> Result<ProposalType, RepositoryError> {
    Ok(ProposalType {
        id: m.id,
        code: m.code,
        name: m.name,
        description: m.description,
        min_pages: m.min_pages,
        max_pages: m.max_pages,
        required_sections: string_list(m.required_sections)?,
        optional_sections: string_list(m.optional_sections)?,
        template_style: m.template_style,
        is_active: m.is_active,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    })
}

fn to_template(m: proposal_template::Model) -> ProposalTemplate {
    ProposalTemplate {
        id: m.id,
        proposal_type_id: m.proposal_type_id,
        section_name: m.section_name,
        section_order: m.section_order,
        is_required: m.is_required,
        min_words: m.min_words,
        max_words: m.max_words,
        description: m.description,
        prompt_template: m.prompt_template,
    }
}

#[async_trait]
impl ProposalTypeRepository for ProposalTypeRepositoryImpl {
    async fn list_active(&self) -> Result<Vec<ProposalType>, RepositoryError> {
        proposal_type::Entity::find()
            .filter(proposal_type::Column::IsActive.eq(true))
            .order_by_asc(proposal_type::Column::Name)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProposalType>, RepositoryError> {
        proposal_type::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ProposalType>, RepositoryError> {
        proposal_type::Entity::find()
            .filter(proposal_type::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn templates_for(
        &self,
        proposal_type_id: Uuid,
    ) -> Result<Vec<ProposalTemplate>, RepositoryError> {
        let models = proposal_template::Entity::find()
            .filter(proposal_template::Column::ProposalTypeId.eq(proposal_type_id))
            .order_by_asc(proposal_template::Column::SectionOrder)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(to_template).collect())
    }

    async fn create_with_templates(
        &self,
        item: &ProposalType,
        templates: &[ProposalTemplate],
    ) -> Result<ProposalType, RepositoryError> {
        let required = serde_json::to_value(&item.required_sections)
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
        let optional = serde_json::to_value(&item.optional_sections)
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;

        let txn = self.db.begin().await?;

        proposal_type::ActiveModel {
            id: Set(item.id),
            code: Set(item.code.clone()),
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            min_pages: Set(item.min_pages),
            max_pages: Set(item.max_pages),
            required_sections: Set(required),
            optional_sections: Set(optional),
            template_style: Set(item.template_style.clone()),
            is_active: Set(item.is_active),
            created_at: Set(item.created_at.into()),
            updated_at: Set(item.updated_at.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "proposal type"))?;

        for template in templates {
            proposal_template::ActiveModel {
                id: Set(template.id),
                proposal_type_id: Set(item.id),
                section_name: Set(template.section_name.clone()),
                section_order: Set(template.section_order),
                is_required: Set(template.is_required),
                min_words: Set(template.min_words),
                max_words: Set(template.max_words),
                description: Set(template.description.clone()),
                prompt_template: Set(template.prompt_template.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(item.clone())
    }
}
