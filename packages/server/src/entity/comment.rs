use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub blog_id: i32,
    #[sea_orm(belongs_to, from = "blog_id", to = "id", on_delete = "Cascade")]
    pub blog: HasOne<super::blog::Entity>,

    pub account_id: i32,
    #[sea_orm(belongs_to, from = "account_id", to = "id", on_delete = "Cascade")]
    pub account: HasOne<super::account::Entity>,

    pub comment: String,
    pub commented_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
