use sea_orm_migration::prelude::*;

use crate::m20260105_000001_create_accounts::Users;
use crate::m20260105_000002_create_proposal_catalog::ProposalTypes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SavedProposals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedProposals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavedProposals::UserId).uuid().not_null())
                    .col(ColumnDef::new(SavedProposals::ProposalTypeId).uuid())
                    .col(ColumnDef::new(SavedProposals::Title).string_len(500).not_null())
                    .col(
                        ColumnDef::new(SavedProposals::Keywords)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SavedProposals::Description).text().not_null())
                    .col(ColumnDef::new(SavedProposals::Content).text().not_null())
                    .col(ColumnDef::new(SavedProposals::ContentJson).json().not_null())
                    .col(ColumnDef::new(SavedProposals::RetrievedPapers).json().not_null())
                    .col(ColumnDef::new(SavedProposals::CitationsData).json().not_null())
                    .col(
                        ColumnDef::new(SavedProposals::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::CitationCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::PageCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::Status)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::IsLatest)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SavedProposals::RootId).uuid().not_null())
                    .col(
                        ColumnDef::new(SavedProposals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SavedProposals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_proposals_user")
                            .from(SavedProposals::Table, SavedProposals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_proposals_type")
                            .from(SavedProposals::Table, SavedProposals::ProposalTypeId)
                            .to(ProposalTypes::Table, ProposalTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalSections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalSections::ProposalId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProposalSections::SectionName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProposalSections::SectionOrder).integer().not_null())
                    .col(ColumnDef::new(ProposalSections::Content).text().not_null())
                    .col(
                        ColumnDef::new(ProposalSections::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProposalSections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposal_sections_proposal")
                            .from(ProposalSections::Table, ProposalSections::ProposalId)
                            .to(SavedProposals::Table, SavedProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProposalSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavedProposals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum SavedProposals {
    Table,
    Id,
    UserId,
    ProposalTypeId,
    Title,
    Keywords,
    Description,
    Content,
    ContentJson,
    RetrievedPapers,
    CitationsData,
    WordCount,
    CitationCount,
    PageCount,
    Status,
    Version,
    IsLatest,
    RootId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ProposalSections {
    Table,
    Id,
    ProposalId,
    SectionName,
    SectionOrder,
    Content,
    WordCount,
    UpdatedAt,
}
