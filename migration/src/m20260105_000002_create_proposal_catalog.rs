use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProposalTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalTypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProposalTypes::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ProposalTypes::Name).string_len(200).not_null())
                    .col(ColumnDef::new(ProposalTypes::Description).text().not_null())
                    .col(ColumnDef::new(ProposalTypes::MinPages).integer().not_null())
                    .col(ColumnDef::new(ProposalTypes::MaxPages).integer().not_null())
                    .col(ColumnDef::new(ProposalTypes::RequiredSections).json().not_null())
                    .col(ColumnDef::new(ProposalTypes::OptionalSections).json().not_null())
                    .col(ColumnDef::new(ProposalTypes::TemplateStyle).json().not_null())
                    .col(
                        ColumnDef::new(ProposalTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ProposalTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProposalTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalTemplates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalTemplates::ProposalTypeId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProposalTemplates::SectionName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProposalTemplates::SectionOrder).integer().not_null())
                    .col(
                        ColumnDef::new(ProposalTemplates::IsRequired)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ProposalTemplates::MinWords).integer().not_null())
                    .col(ColumnDef::new(ProposalTemplates::MaxWords).integer().not_null())
                    .col(ColumnDef::new(ProposalTemplates::Description).text().not_null())
                    .col(ColumnDef::new(ProposalTemplates::PromptTemplate).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposal_templates_type")
                            .from(ProposalTemplates::Table, ProposalTemplates::ProposalTypeId)
                            .to(ProposalTypes::Table, ProposalTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProposalTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProposalTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ProposalTypes {
    Table,
    Id,
    Code,
    Name,
    Description,
    MinPages,
    MaxPages,
    RequiredSections,
    OptionalSections,
    TemplateStyle,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ProposalTemplates {
    Table,
    Id,
    ProposalTypeId,
    SectionName,
    SectionOrder,
    IsRequired,
    MinWords,
    MaxWords,
    Description,
    PromptTemplate,
}
