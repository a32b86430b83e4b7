use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::SearchResult;
use crate::models::SavedSearch;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedSearchRepository: Send + Sync {
    async fn create(&self, search: SavedSearch) -> SearchResult<SavedSearch>;

    /// Newest first.
    async fn list(&self, owner_id: &str) -> SearchResult<Vec<SavedSearch>>;

    async fn get(&self, owner_id: &str, id: &str) -> SearchResult<Option<SavedSearch>>;

    async fn delete(&self, owner_id: &str, id: &str) -> SearchResult<bool>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySavedSearchRepository {
    searches: Arc<RwLock<HashMap<String, SavedSearch>>>,
}

impl InMemorySavedSearchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedSearchRepository for InMemorySavedSearchRepository {
    async fn create(&self, search: SavedSearch) -> SearchResult<SavedSearch> {
        self.searches
            .write()
            .await
            .insert(search.id.clone(), search.clone());
        Ok(search)
    }

    async fn list(&self, owner_id: &str) -> SearchResult<Vec<SavedSearch>> {
        let searches = self.searches.read().await;
        let mut result: Vec<SavedSearch> = searches
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn get(&self, owner_id: &str, id: &str) -> SearchResult<Option<SavedSearch>> {
        let searches = self.searches.read().await;
        Ok(searches.get(id).filter(|s| s.owner_id == owner_id).cloned())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> SearchResult<bool> {
        let mut searches = self.searches.write().await;
        if searches.get(id).is_some_and(|s| s.owner_id == owner_id) {
            searches.remove(id);
            return Ok(true);
        }
        Ok(false)
    }
}
