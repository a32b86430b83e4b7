use async_trait::async_trait;
use database::postgres::{format_vector_literal, has_vector_extension, parse_vector_literal};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, Value,
};
use tracing::{debug, info};

use crate::cursor::Cursor;
use crate::entity::{self, Column, Entity};
use crate::error::ItemResult;
use crate::models::{Item, UpdateItem};
use crate::repository::{ItemQuery, ItemRepository};
use crate::similarity;

const ITEM_COLUMNS: &str = "id, owner_id, img_url, title, vendor, price, currency, description, \
     colour_hex, category, material, src_url, tags, notes, created_at, updated_at";

/// Postgres-backed items. With pgvector installed, similarity runs in the
/// database (`<=>`); otherwise embeddings live in a `jsonb` column and are
/// ranked in process.
#[derive(Clone)]
pub struct PgItemRepository {
    db: DatabaseConnection,
    vector_enabled: bool,
}

impl PgItemRepository {
    pub fn new(db: DatabaseConnection, vector_enabled: bool) -> Self {
        Self { db, vector_enabled }
    }

    /// Probe the database for pgvector and build the repository accordingly.
    pub async fn detect(db: DatabaseConnection) -> Result<Self, DbErr> {
        let vector_enabled = has_vector_extension(&db).await?;
        info!(vector_enabled, "Item repository ready");
        Ok(Self::new(db, vector_enabled))
    }

    pub fn vector_enabled(&self) -> bool {
        self.vector_enabled
    }

    fn embedding_cast(&self) -> &'static str {
        if self.vector_enabled { "vector" } else { "jsonb" }
    }
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn lower_like(column: Column, pattern: String) -> Expr {
    Func::lower(Expr::col((Entity, column))).like(pattern)
}

fn text_condition(text: &str) -> Condition {
    let pattern = like_pattern(text);
    [Column::Title, Column::Vendor, Column::Description, Column::Category]
        .into_iter()
        .fold(Condition::any(), |cond, column| {
            cond.add(lower_like(column, pattern.clone()))
        })
}

fn cursor_condition(cursor: &Cursor) -> Condition {
    let created_at: DateTimeWithTimeZone = cursor.created_at.into();
    let before = Column::CreatedAt.lt(created_at);
    match &cursor.id {
        Some(id) => Condition::any().add(before).add(
            Condition::all()
                .add(Column::CreatedAt.eq(created_at))
                .add(Column::Id.lt(id.clone())),
        ),
        None => Condition::all().add(before),
    }
}

fn query_condition(query: &ItemQuery) -> Condition {
    let mut cond = Condition::all().add(Column::OwnerId.eq(query.owner_id.clone()));

    if let Some(text) = query.text.as_deref() {
        cond = cond.add(text_condition(text));
    }
    if let Some(hex) = query.filters.colour_hex.as_deref() {
        cond = cond.add(lower_like(Column::ColourHex, like_pattern(hex)));
    }
    if let Some(price_max) = query.filters.price_max {
        cond = cond.add(Column::Price.lte(price_max));
    }
    if let Some(category) = query.filters.category.clone() {
        cond = cond.add(Column::Category.eq(category));
    }
    if let Some(vendor) = query.filters.vendor.clone() {
        cond = cond.add(Column::Vendor.eq(vendor));
    }
    if let Some(cursor) = &query.cursor {
        cond = cond.add(cursor_condition(cursor));
    }
    cond
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn insert(&self, item: Item) -> ItemResult<Item> {
        let active: entity::ActiveModel = item.into();
        let model = active.insert(&self.db).await?;
        debug!(item_id = %model.id, "Inserted item");
        Ok(model.into())
    }

    async fn get(&self, owner_id: &str, id: &str) -> ItemResult<Option<Item>> {
        let model = Entity::find_by_id(id.to_string())
            .filter(Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn get_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateItem,
    ) -> ItemResult<Option<Item>> {
        if self.get(owner_id, id).await?.is_none() {
            return Ok(None);
        }
        let model = entity::ActiveModel::from_update(id.to_string(), update)
            .update(&self.db)
            .await?;
        Ok(Some(model.into()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> ItemResult<bool> {
        let result = Entity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_many(&self, owner_id: &str, ids: &[String]) -> ItemResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = Entity::delete_many()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn search(&self, query: &ItemQuery) -> ItemResult<Vec<Item>> {
        let models = Entity::find()
            .filter(query_condition(query))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(query.limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn same_category(
        &self,
        owner_id: &str,
        category: Option<String>,
        exclude_id: &str,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        let category_cond = match category {
            Some(category) => Column::Category.eq(category),
            None => Column::Category.is_null(),
        };
        let models = Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Id.ne(exclude_id))
            .filter(category_cond)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> ItemResult<()> {
        let sql = format!(
            "UPDATE items SET embedding = $1::{} WHERE id = $2",
            self.embedding_cast()
        );
        self.db
            .execute_raw(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                [format_vector_literal(embedding).into(), id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn embedding(&self, owner_id: &str, id: &str) -> ItemResult<Option<Vec<f32>>> {
        let row = self
            .db
            .query_one_raw(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT embedding::text AS embedding FROM items WHERE id = $1 AND owner_id = $2",
                [id.into(), owner_id.into()],
            ))
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: Option<String> = row.try_get("", "embedding")?;
        Ok(raw.as_deref().and_then(parse_vector_literal))
    }

    async fn nearest(
        &self,
        owner_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        if self.vector_enabled {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM items \
                 WHERE owner_id = $1 AND embedding IS NOT NULL \
                 AND 1 - (embedding <=> $2::vector) > $3 \
                 ORDER BY embedding <=> $2::vector \
                 LIMIT $4"
            );
            let values: [Value; 4] = [
                owner_id.into(),
                format_vector_literal(embedding).into(),
                f64::from(threshold).into(),
                (limit as i64).into(),
            ];
            let models = Entity::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    sql,
                    values,
                ))
                .all(&self.db)
                .await?;
            return Ok(models.into_iter().map(Into::into).collect());
        }

        let sql = format!(
            "SELECT {ITEM_COLUMNS}, embedding::text AS embedding_text FROM items \
             WHERE owner_id = $1 AND embedding IS NOT NULL"
        );
        let rows = self
            .db
            .query_all_raw(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                [owner_id.into()],
            ))
            .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let model = entity::Model::from_query_result(&row, "")?;
            let raw: String = row.try_get("", "embedding_text")?;
            if let Some(vector) = parse_vector_literal(&raw) {
                candidates.push((Item::from(model), vector));
            }
        }
        Ok(similarity::rank(candidates, embedding, threshold, limit as usize))
    }

    async fn count(&self) -> ItemResult<u64> {
        Ok(Entity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StructuredFilters;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Lamp"), "%lamp%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn text_query_renders_owner_and_ordering() {
        let query = ItemQuery {
            owner_id: "alice".into(),
            text: Some("lamp".into()),
            filters: StructuredFilters {
                price_max: Some(100.0),
                ..Default::default()
            },
            cursor: Cursor::parse("2024-01-01T00:00:00Z|item-3"),
            limit: 20,
        };
        let sql = Entity::find()
            .filter(query_condition(&query))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(query.limit)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""items"."owner_id" = 'alice'"#), "{sql}");
        assert!(
            sql.contains(r#"LOWER("items"."title") LIKE '%lamp%'"#),
            "{sql}"
        );
        assert!(
            sql.contains(r#"LOWER("items"."category") LIKE '%lamp%'"#),
            "{sql}"
        );
        assert!(sql.contains(r#""items"."id" < 'item-3'"#), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "items"."created_at" DESC, "items"."id" DESC"#),
            "{sql}"
        );
        assert!(sql.ends_with("LIMIT 20"), "{sql}");
    }

    #[test]
    fn text_and_hex_patterns_are_bound_parameters() {
        let query = ItemQuery {
            owner_id: "alice".into(),
            text: Some("Lamp".into()),
            filters: StructuredFilters {
                colour_hex: Some("#C4A484".into()),
                ..Default::default()
            },
            cursor: None,
            limit: 20,
        };
        let stmt = Entity::find()
            .filter(query_condition(&query))
            .build(DbBackend::Postgres);

        assert!(!stmt.sql.contains('?'), "{}", stmt.sql);
        assert!(
            stmt.sql.contains(r#"LOWER("items"."title") LIKE $2"#),
            "{}",
            stmt.sql
        );
        assert!(
            stmt.sql.contains(r#"LOWER("items"."colour_hex") LIKE $6"#),
            "{}",
            stmt.sql
        );

        let values = stmt.values.expect("bound values").0;
        assert_eq!(values.len(), 6);
        assert_eq!(values[1], Value::from("%lamp%"));
        assert_eq!(values[5], Value::from("%#c4a484%"));
    }
}
