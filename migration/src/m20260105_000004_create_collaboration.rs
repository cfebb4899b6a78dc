use sea_orm_migration::prelude::*;

use crate::m20260105_000001_create_accounts::Users;
use crate::m20260105_000003_create_saved_proposals::{ProposalSections, SavedProposals};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProposalCollaborators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalCollaborators::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalCollaborators::ProposalId).uuid().not_null())
                    .col(ColumnDef::new(ProposalCollaborators::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProposalCollaborators::Role)
                            .string_len(20)
                            .not_null()
                            .default("viewer"),
                    )
                    .col(ColumnDef::new(ProposalCollaborators::InvitedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(ProposalCollaborators::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaborators_proposal")
                            .from(ProposalCollaborators::Table, ProposalCollaborators::ProposalId)
                            .to(SavedProposals::Table, SavedProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaborators_user")
                            .from(ProposalCollaborators::Table, ProposalCollaborators::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalComments::ProposalId).uuid().not_null())
                    .col(ColumnDef::new(ProposalComments::SectionId).uuid())
                    .col(ColumnDef::new(ProposalComments::UserId).uuid().not_null())
                    .col(ColumnDef::new(ProposalComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(ProposalComments::Resolved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProposalComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProposalComments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_proposal")
                            .from(ProposalComments::Table, ProposalComments::ProposalId)
                            .to(SavedProposals::Table, SavedProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_section")
                            .from(ProposalComments::Table, ProposalComments::SectionId)
                            .to(ProposalSections::Table, ProposalSections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_user")
                            .from(ProposalComments::Table, ProposalComments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProposalComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProposalCollaborators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ProposalCollaborators {
    Table,
    Id,
    ProposalId,
    UserId,
    Role,
    InvitedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ProposalComments {
    Table,
    Id,
    ProposalId,
    SectionId,
    UserId,
    Content,
    Resolved,
    CreatedAt,
    UpdatedAt,
}
