use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Sole login key.
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 PHC string

    pub name: String,
    pub phone: String,
    pub address: String,

    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub is_superuser: bool,

    /// Outstanding 6-digit code, cleared once consumed.
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub blogs: HasMany<super::blog::Entity>,
    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,
    #[sea_orm(has_many)]
    pub likes: HasMany<super::like::Entity>,

    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
