use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::error::SearchError;
use crate::models::{SavedSearch, SearchFilters};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_searches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub filters: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SavedSearch {
    type Error = SearchError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let filters: SearchFilters = serde_json::from_value(model.filters)?;
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            filters,
            created_at: model.created_at.into(),
        })
    }
}

impl TryFrom<SavedSearch> for ActiveModel {
    type Error = SearchError;

    fn try_from(search: SavedSearch) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(search.id),
            owner_id: Set(search.owner_id),
            name: Set(search.name),
            filters: Set(serde_json::to_value(&search.filters)?),
            created_at: Set(search.created_at.into()),
        })
    }
}
