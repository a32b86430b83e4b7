use domain_items::ItemRepository;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProjectError, ProjectResult};
use crate::models::{
    CreateProject, Project, ProjectCreated, ProjectDetail, ProjectSummary, ProjectView,
    UpdateProject,
};
use crate::repository::ProjectRepository;

/// Service layer for Project business logic
///
/// Every operation checks that the project belongs to the caller before
/// touching links; items are always read through the owner-scoped item
/// repository.
pub struct ProjectService<R: ProjectRepository, I: ItemRepository> {
    repository: Arc<R>,
    items: Arc<I>,
}

impl<R: ProjectRepository, I: ItemRepository> ProjectService<R, I> {
    pub fn new(repository: Arc<R>, items: Arc<I>) -> Self {
        Self { repository, items }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    async fn owned(&self, owner_id: &str, id: &str) -> ProjectResult<Project> {
        self.repository
            .get(owner_id, id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: &str, input: CreateProject) -> ProjectResult<ProjectCreated> {
        let project = self
            .repository
            .create(Project::new(owner_id, input))
            .await?;
        Ok(ProjectCreated::from(&project))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, owner_id: &str) -> ProjectResult<Vec<ProjectSummary>> {
        self.repository.list(owner_id).await
    }

    /// Project with its items, newest first. Linked items the caller does not
    /// own are left out.
    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: &str, id: &str) -> ProjectResult<ProjectDetail> {
        let project = self.owned(owner_id, id).await?;
        let item_ids = self.repository.item_ids(id).await?;
        let items = self.items.get_many(owner_id, &item_ids).await?;
        Ok(ProjectDetail::new(project, items))
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateProject,
    ) -> ProjectResult<ProjectView> {
        if update.is_empty() {
            return Err(ProjectError::NoFieldsToUpdate);
        }
        self.repository
            .update(owner_id, id, update)
            .await?
            .map(ProjectView::from)
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: &str) -> ProjectResult<()> {
        if !self.repository.delete(owner_id, id).await? {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Idempotent. The item must belong to the caller as well.
    #[instrument(skip(self))]
    pub async fn add_item(&self, owner_id: &str, project_id: &str, item_id: &str) -> ProjectResult<()> {
        self.owned(owner_id, project_id).await?;
        if self.items.get(owner_id, item_id).await?.is_none() {
            return Err(ProjectError::ItemNotFound(item_id.to_string()));
        }
        self.repository.add_item(project_id, item_id).await
    }

    /// Idempotent.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        owner_id: &str,
        project_id: &str,
        item_id: &str,
    ) -> ProjectResult<()> {
        self.owned(owner_id, project_id).await?;
        self.repository.remove_item(project_id, item_id).await
    }
}

impl<R: ProjectRepository, I: ItemRepository> Clone for ProjectService<R, I> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            items: Arc::clone(&self.items),
        }
    }
}
