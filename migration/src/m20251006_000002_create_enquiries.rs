use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Enquiries {
    Table,
    Id,
    ChildName,
    Grade,
    BoardingType,
    Email,
    Mobile,
    Message,
    SubmittedBy,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enquiries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Enquiries::ChildName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enquiries::Grade).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Enquiries::BoardingType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enquiries::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Enquiries::Mobile).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Enquiries::Message)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Enquiries::SubmittedBy).uuid().null())
                    .col(
                        ColumnDef::new(Enquiries::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Enquiries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Enquiries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enquiries_email")
                    .table(Enquiries::Table)
                    .col(Enquiries::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enquiries_submitted_at")
                    .table(Enquiries::Table)
                    .col(Enquiries::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enquiries_submitted_by")
                    .table(Enquiries::Table)
                    .col(Enquiries::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enquiries::Table).if_exists().to_owned())
            .await
    }
}
