use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    /// NULL only between the insert and slug assignment of a create.
    #[sea_orm(unique)]
    pub slug: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id", on_delete = "Cascade")]
    pub author: HasOne<super::account::Entity>,

    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id", on_delete = "Cascade")]
    pub category: HasOne<super::category::Entity>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::image::Entity>,
    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,
    #[sea_orm(has_many)]
    pub likes: HasMany<super::like::Entity>,

    pub pub_date: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
