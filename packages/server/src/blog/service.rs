use chrono::Utc;
use common::{MediaKey, MediaStore};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::{debug, info};

use crate::entity::{account, blog, comment, image, like};
use crate::error::AppError;
use crate::utils::slug::{is_slug, unique_blog_slug};

use super::category::{find_category_by_name, touch_category};

/// Attempts at assigning a derived slug before giving up on a create.
const SLUG_ATTEMPTS: usize = 3;

/// An uploaded image held in memory until the write it belongs to has
/// passed its checks.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// An image written to the media store, ready to be recorded.
struct StoredImage {
    key: MediaKey,
    filename: String,
    content_type: String,
    size: i64,
}

#[derive(Debug)]
pub struct NewBlog {
    pub title: String,
    pub body: String,
    /// Category name.
    pub category: String,
    /// Client-chosen slug; derived from the title when absent.
    pub slug: Option<String>,
    pub images: Vec<NewImage>,
}

/// Fields of an update; `None` leaves the stored value.
#[derive(Debug, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub images: Vec<NewImage>,
}

/// Blog writes. Each mutation runs in one transaction that also covers slug
/// assignment and the category touch.
pub struct BlogService<'a, C: ConnectionTrait> {
    pub(super) conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> BlogService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<blog::Model, AppError> {
        blog::Entity::find()
            .filter(blog::Column::Slug.eq(slug))
            .one(self.conn)
            .await?
            .ok_or_else(|| blog_not_found(slug))
    }

    /// Images reach `media` only once the slug, category and insert have
    /// succeeded.
    pub async fn create(
        &self,
        media: &dyn MediaStore,
        author_id: i32,
        new: NewBlog,
    ) -> Result<blog::Model, AppError> {
        let requested_slug = match new.slug.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(slug) if is_slug(slug) => Some(slug.to_string()),
            Some(_) => {
                return Err(AppError::Validation(
                    "Slug must contain only lowercase letters, digits and hyphens".into(),
                ));
            }
        };

        let txn = self.conn.begin().await?;
        let category = find_category_by_name(&txn, &new.category).await?;

        let model = blog::ActiveModel {
            title: Set(new.title.trim().to_string()),
            slug: Set(requested_slug),
            body: Set(new.body),
            author_id: Set(author_id),
            category_id: Set(category.id),
            pub_date: Set(Utc::now()),
            ..Default::default()
        };
        let created = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::SlugTaken,
            _ => AppError::from(e),
        })?;

        let created = match created.slug {
            Some(_) => created,
            None => assign_slug(&txn, created).await?,
        };

        let stored = store_images(media, new.images).await?;
        save_images(&txn, created.id, &stored).await?;
        touch_category(&txn, category.id).await?;
        txn.commit().await?;

        info!(blog_id = created.id, slug = ?created.slug, "Blog created");
        Ok(created)
    }

    /// Apply an author's edit. The slug, author and publish date never change.
    pub async fn update(
        &self,
        media: &dyn MediaStore,
        slug: &str,
        editor_id: i32,
        changes: BlogChanges,
    ) -> Result<blog::Model, AppError> {
        let txn = self.conn.begin().await?;
        let existing = lock_blog(&txn, slug).await?;
        if existing.author_id != editor_id {
            return Err(AppError::PermissionDenied);
        }

        let category_id = match changes.category {
            Some(name) => find_category_by_name(&txn, &name).await?.id,
            None => existing.category_id,
        };

        let mut active: blog::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(body) = changes.body {
            active.body = Set(body);
        }
        active.category_id = Set(category_id);
        let updated = active.update(&txn).await?;

        let stored = store_images(media, changes.images).await?;
        save_images(&txn, updated.id, &stored).await?;
        touch_category(&txn, category_id).await?;
        txn.commit().await?;

        info!(blog_id = updated.id, "Blog updated");
        Ok(updated)
    }

    /// Delete an author's blog with its images, comments and likes. Stored
    /// media files are content-addressed and may be shared, so they stay.
    pub async fn delete(&self, slug: &str, requester_id: i32) -> Result<blog::Model, AppError> {
        let txn = self.conn.begin().await?;
        let existing = lock_blog(&txn, slug).await?;
        if existing.author_id != requester_id {
            return Err(AppError::PermissionDenied);
        }

        delete_blog_rows(&txn, existing.id).await?;
        txn.commit().await?;

        info!(blog_id = existing.id, "Blog deleted");
        Ok(existing)
    }

    /// Flip the caller's like on a blog and report the resulting state.
    ///
    /// The caller's account row is locked for the duration, so concurrent
    /// toggles by the same account apply one after the other.
    pub async fn toggle_like(&self, slug: &str, account_id: i32) -> Result<bool, AppError> {
        let target = self.find_by_slug(slug).await?;

        let txn = self.conn.begin().await?;
        account::Entity::find_by_id(account_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        let removed = like::Entity::delete_many()
            .filter(like::Column::BlogId.eq(target.id))
            .filter(like::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await?;

        let liked = if removed.rows_affected > 0 {
            false
        } else {
            let pair = like::ActiveModel {
                blog_id: Set(target.id),
                account_id: Set(account_id),
                liked_at: Set(Utc::now()),
            };
            let inserted = like::Entity::insert(pair)
                .on_conflict(
                    OnConflict::columns([like::Column::BlogId, like::Column::AccountId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await;
            match inserted {
                Ok(_) | Err(DbErr::RecordNotInserted) => true,
                Err(e) => return Err(e.into()),
            }
        };
        txn.commit().await?;

        debug!(blog_id = target.id, account_id, liked, "Like toggled");
        Ok(liked)
    }

    pub async fn add_comment(
        &self,
        slug: &str,
        account_id: i32,
        text: &str,
    ) -> Result<comment::Model, AppError> {
        let target = self.find_by_slug(slug).await?;

        let model = comment::ActiveModel {
            blog_id: Set(target.id),
            account_id: Set(account_id),
            comment: Set(text.trim().to_string()),
            commented_at: Set(Utc::now()),
            ..Default::default()
        };
        Ok(model.insert(self.conn).await?)
    }
}

fn blog_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("Blog with slug '{slug}' does not exist"))
}

async fn lock_blog<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<blog::Model, AppError> {
    blog::Entity::find()
        .filter(blog::Column::Slug.eq(slug))
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| blog_not_found(slug))
}

/// Give a freshly inserted blog its derived slug.
///
/// Each attempt runs under a savepoint; a unique violation from a concurrent
/// writer rolls back only the attempt and derives the slug again.
async fn assign_slug<C>(txn: &C, created: blog::Model) -> Result<blog::Model, AppError>
where
    C: ConnectionTrait + TransactionTrait,
{
    for attempt in 1..=SLUG_ATTEMPTS {
        let candidate = unique_blog_slug(txn, &created.title, created.id).await?;

        let savepoint = txn.begin().await?;
        let mut active: blog::ActiveModel = created.clone().into();
        active.slug = Set(Some(candidate.clone()));

        match active.update(&savepoint).await {
            Ok(updated) => {
                savepoint.commit().await?;
                return Ok(updated);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(blog_id = created.id, attempt, slug = %candidate, "Slug claimed concurrently, retrying");
                savepoint.rollback().await?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(format!(
        "could not assign a slug to blog {} after {SLUG_ATTEMPTS} attempts",
        created.id
    )))
}

/// Write uploads to the media store. Runs after every check of the
/// enclosing write, so a rejected request leaves no files behind.
async fn store_images(
    media: &dyn MediaStore,
    images: Vec<NewImage>,
) -> Result<Vec<StoredImage>, AppError> {
    let mut stored = Vec::with_capacity(images.len());
    for img in images {
        let key = media.save(&img.filename, &img.data).await?;
        stored.push(StoredImage {
            key,
            size: img.data.len() as i64,
            filename: img.filename,
            content_type: img.content_type,
        });
    }
    Ok(stored)
}

/// Create or refresh image rows. An image already attached under the same
/// storage key is updated in place; nothing is ever detached here.
async fn save_images<C: ConnectionTrait>(
    conn: &C,
    blog_id: i32,
    images: &[StoredImage],
) -> Result<(), AppError> {
    for img in images {
        let storage_key = img.key.relative_path();
        let existing = image::Entity::find()
            .filter(image::Column::BlogId.eq(blog_id))
            .filter(image::Column::StorageKey.eq(&storage_key))
            .one(conn)
            .await?;

        match existing {
            Some(row) => {
                let mut active: image::ActiveModel = row.into();
                active.filename = Set(img.filename.clone());
                active.content_type = Set(img.content_type.clone());
                active.size = Set(img.size);
                if active.is_changed() {
                    active.update(conn).await?;
                }
            }
            None => {
                image::ActiveModel {
                    blog_id: Set(blog_id),
                    storage_key: Set(storage_key),
                    filename: Set(img.filename.clone()),
                    content_type: Set(img.content_type.clone()),
                    size: Set(img.size),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
    }
    Ok(())
}

/// Remove a blog and everything hanging off it.
pub(super) async fn delete_blog_rows<C: ConnectionTrait>(conn: &C, blog_id: i32) -> Result<(), DbErr> {
    like::Entity::delete_many()
        .filter(like::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;
    image::Entity::delete_many()
        .filter(image::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;
    blog::Entity::delete_by_id(blog_id).exec(conn).await?;
    Ok(())
}
