use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    /// Always `slugify(name)`.
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(has_many)]
    pub blogs: HasMany<super::blog::Entity>,

    pub created_at: DateTimeUtc,
    /// Advanced on every blog create/update in this category.
    pub modified_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
