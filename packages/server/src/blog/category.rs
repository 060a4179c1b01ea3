use chrono::{DateTime, Utc};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::info;

use crate::entity::{blog, category};
use crate::error::AppError;
use crate::models::category::{CreateCategoryRequest, UpdateCategoryRequest};

/// Timestamp a category moves to when one of its blogs changes. Never earlier
/// than the current value, so clock skew between writers cannot move it back.
pub fn next_modified_at(current: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    current.max(now)
}

/// Advance `modified_at` of a category under a row lock.
pub async fn touch_category<C: ConnectionTrait>(conn: &C, category_id: i32) -> Result<(), AppError> {
    let current = category::Entity::find_by_id(category_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {category_id} not found")))?;

    let modified_at = next_modified_at(current.modified_at, Utc::now());
    let mut active: category::ActiveModel = current.into();
    active.modified_at = Set(modified_at);
    active.update(conn).await?;
    Ok(())
}

/// Resolve a category by exact name. Blog writes refer to categories by name,
/// so an unknown one is a validation failure rather than a 404.
pub async fn find_category_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<category::Model, AppError> {
    category::Entity::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Category '{}' does not exist", name.trim())))
}

fn name_taken(e: sea_orm::DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::NameTaken,
        _ => AppError::from(e),
    }
}

pub struct CategoryService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> CategoryService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Most recently active categories first.
    pub async fn list(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(category::Entity::find()
            .order_by_desc(category::Column::ModifiedAt)
            .order_by_desc(category::Column::CreatedAt)
            .all(self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<category::Model, AppError> {
        category::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
    }

    /// `slug` is the already validated `slugify(name)`.
    pub async fn create(
        &self,
        payload: CreateCategoryRequest,
        slug: String,
    ) -> Result<category::Model, AppError> {
        let now = Utc::now();
        let model = category::ActiveModel {
            name: Set(payload.name.trim().to_string()),
            slug: Set(slug),
            description: Set(payload.description),
            created_at: Set(now),
            modified_at: Set(now),
            ..Default::default()
        };
        let created = model.insert(self.conn).await.map_err(name_taken)?;
        info!(category_id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    /// Rename or re-describe a category. Renaming re-derives the slug.
    pub async fn update(
        &self,
        id: i32,
        payload: UpdateCategoryRequest,
        slug: Option<String>,
    ) -> Result<category::Model, AppError> {
        let existing = self.get(id).await?;
        let mut active: category::ActiveModel = existing.clone().into();
        if let (Some(name), Some(slug)) = (payload.name, slug) {
            active.name = Set(name.trim().to_string());
            active.slug = Set(slug);
        }
        if let Some(description) = payload.description {
            active.description = Set(description);
        }
        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(self.conn).await.map_err(name_taken)
    }

    /// Delete a category together with its blogs.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let existing = category::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;

        let blog_ids: Vec<i32> = blog::Entity::find()
            .select_only()
            .column(blog::Column::Id)
            .filter(blog::Column::CategoryId.eq(existing.id))
            .into_tuple()
            .all(&txn)
            .await?;
        for blog_id in &blog_ids {
            super::service::delete_blog_rows(&txn, *blog_id).await?;
        }
        category::Entity::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        info!(category_id = id, blogs = blog_ids.len(), "Category deleted");
        Ok(())
    }
}
