use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SavedSearches::Table)
                    .if_not_exists()
                    .col(string_len(SavedSearches::Id, 64).primary_key())
                    .col(string(SavedSearches::OwnerId))
                    .col(string_len(SavedSearches::Name, 255))
                    .col(json_binary(SavedSearches::Filters).default(Expr::cust("'{}'::jsonb")))
                    .col(
                        timestamp_with_time_zone(SavedSearches::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_saved_searches_owner_id")
                    .table(SavedSearches::Table)
                    .col(SavedSearches::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedSearches::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SavedSearches {
    Table,
    Id,
    OwnerId,
    Name,
    Filters,
    CreatedAt,
}
