use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    SqlErr,
};

use crate::entity::{self, Column, Entity};
use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let active: entity::ActiveModel = user.into();
        let model = active.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::DuplicateEmail
            } else {
                UserError::Database(e)
            }
        })?;
        tracing::info!(user_id = %model.id, "User registered");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: &str) -> UserResult<Option<User>> {
        let model = Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn count(&self) -> UserResult<u64> {
        Ok(Entity::find().count(&self.db).await?)
    }
}
