use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::config::AdminConfig;
use crate::entity::{account, blog, comment};
use crate::utils::hash;

/// Create the configured superuser unless an account already owns its email.
///
/// The account is created active with every privilege flag set.
pub async fn seed_superuser(db: &DatabaseConnection, admin: &AdminConfig) -> anyhow::Result<()> {
    let password = hash::hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;

    let model = account::ActiveModel {
        email: Set(admin.email.trim().to_lowercase()),
        username: Set(Some(admin.username.trim().to_string())),
        password: Set(password),
        name: Set(String::new()),
        phone: Set(String::new()),
        address: Set(String::new()),
        is_active: Set(true),
        is_staff: Set(true),
        is_admin: Set(true),
        is_superuser: Set(true),
        otp: Set(None),
        otp_expires_at: Set(None),
        date_joined: Set(chrono::Utc::now()),
        last_login: Set(None),
        ..Default::default()
    };

    let result = account::Entity::insert(model)
        .on_conflict(
            sea_query::OnConflict::column(account::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!(email = %admin.email, "Seeded superuser"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Ensure the composite indexes behind list and detail queries exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Blog listing filtered by category, newest first.
    let blog_index = Index::create()
        .if_not_exists()
        .name("idx_blog_category_pub_date")
        .table(blog::Entity)
        .col(blog::Column::CategoryId)
        .col(blog::Column::PubDate)
        .to_string(PostgresQueryBuilder);

    // Comments of a blog in posting order.
    let comment_index = Index::create()
        .if_not_exists()
        .name("idx_comment_blog_commented_at")
        .table(comment::Entity)
        .col(comment::Column::BlogId)
        .col(comment::Column::CommentedAt)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_blog_category_pub_date", blog_index),
        ("idx_comment_blog_commented_at", comment_index),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
