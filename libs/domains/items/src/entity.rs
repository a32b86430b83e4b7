use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};

/// `items` table. The `embedding` column is managed with raw SQL and is
/// deliberately absent here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    #[sea_orm(column_type = "Text")]
    pub img_url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub title: Option<String>,
    pub vendor: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub colour_hex: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub src_url: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub tags: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Item {
    fn from(model: Model) -> Self {
        let tags = model
            .tags
            .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok());

        Self {
            id: model.id,
            owner_id: model.owner_id,
            img_url: model.img_url,
            title: model.title,
            vendor: model.vendor,
            price: model.price,
            currency: model.currency,
            description: model.description,
            colour_hex: model.colour_hex,
            category: model.category,
            material: model.material,
            src_url: model.src_url,
            tags,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.map(Into::into),
        }
    }
}

fn tags_json(tags: &Option<Vec<String>>) -> Option<Json> {
    tags.as_ref()
        .map(|tags| Json::Array(tags.iter().cloned().map(Json::String).collect()))
}

impl From<crate::models::Item> for ActiveModel {
    fn from(item: crate::models::Item) -> Self {
        ActiveModel {
            tags: Set(tags_json(&item.tags)),
            id: Set(item.id),
            owner_id: Set(item.owner_id),
            img_url: Set(item.img_url),
            title: Set(item.title),
            vendor: Set(item.vendor),
            price: Set(item.price),
            currency: Set(item.currency),
            description: Set(item.description),
            colour_hex: Set(item.colour_hex),
            category: Set(item.category),
            material: Set(item.material),
            src_url: Set(item.src_url),
            notes: Set(item.notes),
            created_at: Set(item.created_at.into()),
            updated_at: match item.updated_at {
                Some(at) => Set(Some(at.into())),
                None => NotSet,
            },
        }
    }
}

impl ActiveModel {
    /// Active model with only the fields present in `update` marked as set.
    pub fn from_update(id: String, update: crate::models::UpdateItem) -> Self {
        macro_rules! set_if_some {
            ($($field:ident),*) => {
                ActiveModel {
                    id: sea_orm::ActiveValue::Unchanged(id),
                    tags: match &update.tags {
                        Some(_) => Set(tags_json(&update.tags)),
                        None => NotSet,
                    },
                    $($field: match update.$field {
                        Some(value) => Set(Some(value)),
                        None => NotSet,
                    },)*
                    updated_at: Set(Some(chrono::Utc::now().into())),
                    ..Default::default()
                }
            };
        }
        set_if_some!(
            title,
            vendor,
            price,
            currency,
            description,
            colour_hex,
            category,
            material,
            src_url,
            notes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateItem, Item, UpdateItem};

    #[test]
    fn model_round_trip_keeps_tags() {
        let mut item = Item::new(
            "owner",
            CreateItem {
                img_url: "https://example.com/a.jpg".into(),
                tags: Some(vec!["living".into(), "oak".into()]),
                ..Default::default()
            },
            "https://example.com/a.jpg".into(),
        );
        item.created_at = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let active: ActiveModel = item.clone().into();
        assert_eq!(
            active.tags,
            Set(Some(serde_json::json!(["living", "oak"])))
        );
    }

    #[test]
    fn update_marks_only_present_fields() {
        let active = ActiveModel::from_update(
            "item-1".into(),
            UpdateItem {
                title: Some("Lamp".into()),
                ..Default::default()
            },
        );
        assert_eq!(active.title, Set(Some("Lamp".into())));
        assert_eq!(active.vendor, NotSet);
        assert_eq!(active.tags, NotSet);
    }
}
