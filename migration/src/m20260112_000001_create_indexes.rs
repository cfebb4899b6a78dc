use sea_orm_migration::prelude::*;

use crate::m20260105_000002_create_proposal_catalog::ProposalTemplates;
use crate::m20260105_000003_create_saved_proposals::{ProposalSections, SavedProposals};
use crate::m20260105_000004_create_collaboration::{ProposalCollaborators, ProposalComments};
use crate::m20260105_000005_create_analytics_events::AnalyticsEvents;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_proposals_user_latest")
                    .table(SavedProposals::Table)
                    .col(SavedProposals::UserId)
                    .col(SavedProposals::IsLatest)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_saved_proposals_root")
                    .table(SavedProposals::Table)
                    .col(SavedProposals::RootId)
                    .col(SavedProposals::Version)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposal_sections_proposal")
                    .table(ProposalSections::Table)
                    .col(ProposalSections::ProposalId)
                    .col(ProposalSections::SectionOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposal_templates_type_order")
                    .table(ProposalTemplates::Table)
                    .col(ProposalTemplates::ProposalTypeId)
                    .col(ProposalTemplates::SectionOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_collaborators_proposal_user")
                    .table(ProposalCollaborators::Table)
                    .col(ProposalCollaborators::ProposalId)
                    .col(ProposalCollaborators::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_proposal")
                    .table(ProposalComments::Table)
                    .col(ProposalComments::ProposalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analytics_events_user_created")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::UserId)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_user_created")
                    .table(AnalyticsEvents::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_comments_proposal")
                    .table(ProposalComments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_collaborators_proposal_user")
                    .table(ProposalCollaborators::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_proposal_templates_type_order")
                    .table(ProposalTemplates::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_proposal_sections_proposal")
                    .table(ProposalSections::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_saved_proposals_root")
                    .table(SavedProposals::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_saved_proposals_user_latest")
                    .table(SavedProposals::Table)
                    .to_owned(),
            )
            .await
    }
}
