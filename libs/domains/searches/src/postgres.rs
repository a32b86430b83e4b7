use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entity::{self, Column, Entity};
use crate::error::SearchResult;
use crate::models::SavedSearch;
use crate::repository::SavedSearchRepository;

#[derive(Clone)]
pub struct PgSavedSearchRepository {
    db: DatabaseConnection,
}

impl PgSavedSearchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SavedSearchRepository for PgSavedSearchRepository {
    async fn create(&self, search: SavedSearch) -> SearchResult<SavedSearch> {
        let active = entity::ActiveModel::try_from(search)?;
        let model = active.insert(&self.db).await?;
        tracing::info!(search_id = %model.id, "Saved search");
        model.try_into()
    }

    async fn list(&self, owner_id: &str) -> SearchResult<Vec<SavedSearch>> {
        Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(SavedSearch::try_from)
            .collect()
    }

    async fn get(&self, owner_id: &str, id: &str) -> SearchResult<Option<SavedSearch>> {
        Entity::find_by_id(id.to_string())
            .filter(Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?
            .map(SavedSearch::try_from)
            .transpose()
    }

    async fn delete(&self, owner_id: &str, id: &str) -> SearchResult<bool> {
        let result = Entity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn row(id: &str, filters: serde_json::Value) -> entity::Model {
        entity::Model {
            id: id.into(),
            owner_id: "owner".into(),
            name: "Walnut".into(),
            filters,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn reads_stored_filters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("s1", json!({ "material": "Walnut", "extra": 1 }))]])
            .into_connection();
        let repo = PgSavedSearchRepository::new(db);

        let found = repo.get("owner", "s1").await.unwrap().unwrap();
        assert_eq!(found.filters.material.as_deref(), Some("Walnut"));
    }

    #[tokio::test]
    async fn unreadable_filters_are_an_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("s1", json!({ "price_max": "cheap" }))]])
            .into_connection();
        let repo = PgSavedSearchRepository::new(db);
        assert!(repo.list("owner").await.is_err());
    }
}
