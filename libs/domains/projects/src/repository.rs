use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ProjectResult;
use crate::models::{Project, ProjectSummary, UpdateProject};

/// Project persistence. Lookups take the owner so foreign projects read as
/// missing; link operations assume the caller already checked ownership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: Project) -> ProjectResult<Project>;

    async fn get(&self, owner_id: &str, id: &str) -> ProjectResult<Option<Project>>;

    /// Newest first, with the number of linked items.
    async fn list(&self, owner_id: &str) -> ProjectResult<Vec<ProjectSummary>>;

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateProject,
    ) -> ProjectResult<Option<Project>>;

    /// Removes the links and the project together.
    async fn delete(&self, owner_id: &str, id: &str) -> ProjectResult<bool>;

    /// No-op when the link already exists.
    async fn add_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()>;

    /// No-op when the link does not exist.
    async fn remove_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()>;

    async fn item_ids(&self, project_id: &str) -> ProjectResult<Vec<String>>;

    async fn count(&self) -> ProjectResult<u64>;
}

#[derive(Debug, Default)]
struct State {
    projects: HashMap<String, Project>,
    /// `(project_id, item_id)` → linked at
    links: HashMap<(String, String), DateTime<Utc>>,
}

/// In-memory implementation of ProjectRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, project: Project) -> ProjectResult<Project> {
        let mut state = self.state.write().await;
        state.projects.insert(project.id.clone(), project.clone());
        tracing::info!(project_id = %project.id, "Created project");
        Ok(project)
    }

    async fn get(&self, owner_id: &str, id: &str) -> ProjectResult<Option<Project>> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .get(id)
            .filter(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn list(&self, owner_id: &str) -> ProjectResult<Vec<ProjectSummary>> {
        let state = self.state.read().await;

        let mut result: Vec<ProjectSummary> = state
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .map(|p| ProjectSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                created_at: p.created_at,
                item_count: state.links.keys().filter(|(pid, _)| *pid == p.id).count() as u64,
            })
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateProject,
    ) -> ProjectResult<Option<Project>> {
        let mut state = self.state.write().await;
        let Some(project) = state
            .projects
            .get_mut(id)
            .filter(|p| p.owner_id == owner_id)
        else {
            return Ok(None);
        };
        project.apply_update(update);
        Ok(Some(project.clone()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> ProjectResult<bool> {
        let mut state = self.state.write().await;
        let owned = state.projects.get(id).is_some_and(|p| p.owner_id == owner_id);
        if !owned {
            return Ok(false);
        }
        state.links.retain(|(pid, _), _| pid != id);
        state.projects.remove(id);
        tracing::info!(project_id = %id, "Deleted project");
        Ok(true)
    }

    async fn add_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()> {
        let mut state = self.state.write().await;
        state
            .links
            .entry((project_id.to_string(), item_id.to_string()))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn remove_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()> {
        let mut state = self.state.write().await;
        state
            .links
            .remove(&(project_id.to_string(), item_id.to_string()));
        Ok(())
    }

    async fn item_ids(&self, project_id: &str) -> ProjectResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .links
            .keys()
            .filter(|(pid, _)| pid == project_id)
            .map(|(_, item_id)| item_id.clone())
            .collect())
    }

    async fn count(&self) -> ProjectResult<u64> {
        Ok(self.state.read().await.projects.len() as u64)
    }
}
