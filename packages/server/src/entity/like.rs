use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One account's like on one blog. The composite key makes the pair unique.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_like")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub blog_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(belongs_to, from = "blog_id", to = "id", on_delete = "Cascade")]
    pub blog: HasOne<super::blog::Entity>,
    #[sea_orm(belongs_to, from = "account_id", to = "id", on_delete = "Cascade")]
    pub account: HasOne<super::account::Entity>,

    pub liked_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
