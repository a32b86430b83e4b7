//! Sea-ORM entities for `projects` and `project_items`.

pub mod project {
    use sea_orm::ActiveValue::{NotSet, Set};
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "projects")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub owner_id: String,
        pub name: String,
        #[sea_orm(column_type = "Double", nullable)]
        pub budget: Option<f64>,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: Option<DateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::project_item::Entity")]
        ProjectItems,
    }

    impl Related<super::project_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ProjectItems.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Project {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                owner_id: model.owner_id,
                name: model.name,
                budget: model.budget,
                description: model.description,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.map(Into::into),
            }
        }
    }

    impl From<crate::models::Project> for ActiveModel {
        fn from(project: crate::models::Project) -> Self {
            Self {
                id: Set(project.id),
                owner_id: Set(project.owner_id),
                name: Set(project.name),
                budget: Set(project.budget),
                description: Set(project.description),
                created_at: Set(project.created_at.into()),
                updated_at: Set(project.updated_at.map(Into::into)),
            }
        }
    }

    impl ActiveModel {
        /// Only the submitted columns; `updated_at` is left to the trigger.
        pub fn from_update(id: String, update: crate::models::UpdateProject) -> Self {
            Self {
                id: Set(id),
                owner_id: NotSet,
                name: update.name.map(|n| Set(n.trim().to_string())).unwrap_or(NotSet),
                budget: update.budget.map(|b| Set(Some(b))).unwrap_or(NotSet),
                description: update.description.map(|d| Set(Some(d))).unwrap_or(NotSet),
                created_at: NotSet,
                updated_at: NotSet,
            }
        }
    }
}

pub mod project_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "project_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub project_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub item_id: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::project::Entity",
            from = "Column::ProjectId",
            to = "super::project::Column::Id",
            on_delete = "Cascade"
        )]
        Project,
    }

    impl Related<super::project::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Project.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UpdateProject;
    use sea_orm::ActiveValue;

    #[test]
    fn from_update_sets_only_present_columns() {
        let active = project::ActiveModel::from_update(
            "p1".into(),
            UpdateProject {
                name: Some(" Den ".into()),
                ..Default::default()
            },
        );
        assert_eq!(active.name, ActiveValue::Set("Den".to_string()));
        assert!(matches!(active.budget, ActiveValue::NotSet));
        assert!(matches!(active.owner_id, ActiveValue::NotSet));
    }
}
