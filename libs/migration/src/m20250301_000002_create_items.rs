use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(string_len(Items::Id, 64).primary_key())
                    .col(string(Items::OwnerId))
                    .col(text(Items::ImgUrl))
                    .col(text_null(Items::Title))
                    .col(string_null(Items::Vendor))
                    .col(double_null(Items::Price))
                    .col(string_len_null(Items::Currency, 8))
                    .col(text_null(Items::Description))
                    .col(string_len_null(Items::ColourHex, 7))
                    .col(string_null(Items::Category))
                    .col(string_null(Items::Material))
                    .col(text_null(Items::SrcUrl))
                    .col(json_binary_null(Items::Tags))
                    .col(text_null(Items::Notes))
                    .col(
                        timestamp_with_time_zone(Items::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Items::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // pgvector column when available, otherwise a jsonb array ranked in process
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$
                BEGIN
                    IF EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'vector') THEN
                        EXECUTE 'ALTER TABLE items ADD COLUMN IF NOT EXISTS embedding vector(1536)';
                    ELSE
                        EXECUTE 'ALTER TABLE items ADD COLUMN IF NOT EXISTS embedding jsonb';
                    END IF;
                END
                $$
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_items_created_at ON items (created_at DESC, id DESC)",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_owner_id")
                    .table(Items::Table)
                    .col(Items::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_vendor")
                    .table(Items::Table)
                    .col(Items::Vendor)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Items {
    Table,
    Id,
    OwnerId,
    ImgUrl,
    Title,
    Vendor,
    Price,
    Currency,
    Description,
    ColourHex,
    Category,
    Material,
    SrcUrl,
    Tags,
    Notes,
    CreatedAt,
    UpdatedAt,
}
