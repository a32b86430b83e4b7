use std::sync::Arc;
use tracing::instrument;

use crate::error::{SearchError, SearchResult};
use crate::models::{CreateSavedSearch, SavedSearch};
use crate::repository::SavedSearchRepository;

pub struct SavedSearchService<R: SavedSearchRepository> {
    repository: Arc<R>,
}

impl<R: SavedSearchRepository> SavedSearchService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: &str, input: CreateSavedSearch) -> SearchResult<SavedSearch> {
        self.repository
            .create(SavedSearch::new(owner_id, input))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, owner_id: &str) -> SearchResult<Vec<SavedSearch>> {
        self.repository.list(owner_id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: &str, id: &str) -> SearchResult<SavedSearch> {
        self.repository
            .get(owner_id, id)
            .await?
            .ok_or_else(|| SearchError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: &str) -> SearchResult<()> {
        if !self.repository.delete(owner_id, id).await? {
            return Err(SearchError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl<R: SavedSearchRepository> Clone for SavedSearchService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
