use sea_orm_migration::prelude::*;

use crate::m20260105_000001_create_accounts::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // proposal_id carries no foreign key, events survive proposal deletion
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::UserId).uuid().not_null())
                    .col(ColumnDef::new(AnalyticsEvents::Action).string_len(20).not_null())
                    .col(ColumnDef::new(AnalyticsEvents::ProposalId).uuid())
                    .col(ColumnDef::new(AnalyticsEvents::Metadata).json().not_null())
                    .col(ColumnDef::new(AnalyticsEvents::ExecutionTime).double())
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analytics_events_user")
                            .from(AnalyticsEvents::Table, AnalyticsEvents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum AnalyticsEvents {
    Table,
    Id,
    UserId,
    Action,
    ProposalId,
    Metadata,
    ExecutionTime,
    CreatedAt,
}
