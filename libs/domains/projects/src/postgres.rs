use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

use crate::entity::{project, project_item};
use crate::error::ProjectResult;
use crate::models::{Project, ProjectSummary, UpdateProject};
use crate::repository::ProjectRepository;

#[derive(Clone)]
pub struct PgProjectRepository {
    db: DatabaseConnection,
}

impl PgProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: String,
    name: String,
    created_at: DateTimeWithTimeZone,
    item_count: i64,
}

impl From<SummaryRow> for ProjectSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at.into(),
            item_count: row.item_count.max(0) as u64,
        }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: Project) -> ProjectResult<Project> {
        let active: project::ActiveModel = project.into();
        let model = active.insert(&self.db).await?;
        tracing::info!(project_id = %model.id, "Created project");
        Ok(model.into())
    }

    async fn get(&self, owner_id: &str, id: &str) -> ProjectResult<Option<Project>> {
        let model = project::Entity::find_by_id(id.to_string())
            .filter(project::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, owner_id: &str) -> ProjectResult<Vec<ProjectSummary>> {
        let rows = project::Entity::find()
            .select_only()
            .column(project::Column::Id)
            .column(project::Column::Name)
            .column(project::Column::CreatedAt)
            .column_as(project_item::Column::ItemId.count(), "item_count")
            .join(JoinType::LeftJoin, project::Relation::ProjectItems.def())
            .filter(project::Column::OwnerId.eq(owner_id))
            .group_by(project::Column::Id)
            .order_by_desc(project::Column::CreatedAt)
            .order_by_desc(project::Column::Id)
            .into_model::<SummaryRow>()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateProject,
    ) -> ProjectResult<Option<Project>> {
        if self.get(owner_id, id).await?.is_none() {
            return Ok(None);
        }
        let model = project::ActiveModel::from_update(id.to_string(), update)
            .update(&self.db)
            .await?;
        tracing::info!(project_id = %id, "Updated project");
        Ok(Some(model.into()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> ProjectResult<bool> {
        let txn = self.db.begin().await?;

        let owned = project::Entity::find_by_id(id.to_string())
            .filter(project::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await?
            .is_some();
        if !owned {
            txn.rollback().await?;
            return Ok(false);
        }

        project_item::Entity::delete_many()
            .filter(project_item::Column::ProjectId.eq(id))
            .exec(&txn)
            .await?;
        project::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(project_id = %id, "Deleted project");
        Ok(true)
    }

    async fn add_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()> {
        let link = project_item::ActiveModel {
            project_id: Set(project_id.to_string()),
            item_id: Set(item_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        project_item::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    project_item::Column::ProjectId,
                    project_item::Column::ItemId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn remove_item(&self, project_id: &str, item_id: &str) -> ProjectResult<()> {
        project_item::Entity::delete_many()
            .filter(project_item::Column::ProjectId.eq(project_id))
            .filter(project_item::Column::ItemId.eq(item_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn item_ids(&self, project_id: &str) -> ProjectResult<Vec<String>> {
        let links = project_item::Entity::find()
            .filter(project_item::Column::ProjectId.eq(project_id))
            .order_by_desc(project_item::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(links.into_iter().map(|link| link.item_id).collect())
    }

    async fn count(&self) -> ProjectResult<u64> {
        Ok(project::Entity::find().count(&self.db).await?)
    }
}
