use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub blog_id: i32,
    #[sea_orm(belongs_to, from = "blog_id", to = "id", on_delete = "Cascade")]
    pub blog: HasOne<super::blog::Entity>,

    /// `MediaKey` of the stored file.
    pub storage_key: String,
    /// Original upload filename.
    pub filename: String,
    pub content_type: String,
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
