use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::entity::{account, blog, category, comment, image, like};
use crate::error::AppError;

use super::service::BlogService;

/// A blog with everything its representation needs.
#[derive(Debug)]
pub struct BlogView {
    pub blog: blog::Model,
    pub category_name: String,
    pub author_name: String,
    pub author_username: Option<String>,
    pub images: Vec<image::Model>,
    pub comment_count: u64,
    pub like_count: u64,
}

#[derive(Debug)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author_name: String,
    pub author_username: Option<String>,
}

#[derive(Debug)]
pub struct LikeView {
    pub name: String,
    pub username: Option<String>,
    pub liked_at: DateTime<Utc>,
}

/// Filters of the public blog list; both are ANDed when present.
#[derive(Debug, Default)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub username: Option<String>,
}

impl<'a, C: ConnectionTrait + TransactionTrait> BlogService<'a, C> {
    /// One page of blogs, newest first, plus the total match count.
    pub async fn list(
        &self,
        filter: BlogFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<BlogView>, u64), AppError> {
        let mut select = blog::Entity::find();

        if let Some(name) = filter.category.as_deref().map(str::trim) {
            select = select.filter(
                blog::Column::CategoryId.in_subquery(
                    SeaQuery::select()
                        .column(category::Column::Id)
                        .from(category::Entity)
                        .and_where(category::Column::Name.eq(name))
                        .to_owned(),
                ),
            );
        }
        if let Some(username) = filter.username.as_deref().map(str::trim) {
            select = select.filter(
                blog::Column::AuthorId.in_subquery(
                    SeaQuery::select()
                        .column(account::Column::Id)
                        .from(account::Entity)
                        .and_where(account::Column::Username.eq(username))
                        .to_owned(),
                ),
            );
        }

        let total = select.clone().count(self.conn).await?;
        let blogs = select
            .order_by_desc(blog::Column::PubDate)
            .order_by_desc(blog::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.conn)
            .await?;

        Ok((self.hydrate(blogs).await?, total))
    }

    /// A blog and its comments in posting order.
    pub async fn detail(&self, slug: &str) -> Result<(BlogView, Vec<CommentView>), AppError> {
        let found = self.find_by_slug(slug).await?;
        let blog_id = found.id;
        let view = self.view(found).await?;

        let comments = comment::Entity::find()
            .filter(comment::Column::BlogId.eq(blog_id))
            .order_by_asc(comment::Column::CommentedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?;
        let authors = self
            .accounts_by_id(comments.iter().map(|c| c.account_id).collect())
            .await?;

        let comments = comments
            .into_iter()
            .map(|c| {
                let (author_name, author_username) = names(&authors, c.account_id);
                CommentView {
                    comment: c,
                    author_name,
                    author_username,
                }
            })
            .collect();

        Ok((view, comments))
    }

    /// Everyone who likes a blog, most recent first.
    pub async fn likes(&self, slug: &str) -> Result<Vec<LikeView>, AppError> {
        let target = self.find_by_slug(slug).await?;

        let likes = like::Entity::find()
            .filter(like::Column::BlogId.eq(target.id))
            .order_by_desc(like::Column::LikedAt)
            .all(self.conn)
            .await?;
        let accounts = self
            .accounts_by_id(likes.iter().map(|l| l.account_id).collect())
            .await?;

        Ok(likes
            .into_iter()
            .map(|l| {
                let (name, username) = names(&accounts, l.account_id);
                LikeView {
                    name,
                    username,
                    liked_at: l.liked_at,
                }
            })
            .collect())
    }

    /// Resolve a single blog into its view.
    pub async fn view(&self, found: blog::Model) -> Result<BlogView, AppError> {
        let blog_id = found.id;
        self.hydrate(vec![found])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("blog {blog_id} vanished while loading")))
    }

    /// Batch-load categories, authors, images and counts for `blogs`,
    /// preserving their order.
    async fn hydrate(&self, blogs: Vec<blog::Model>) -> Result<Vec<BlogView>, AppError> {
        if blogs.is_empty() {
            return Ok(Vec::new());
        }
        let blog_ids: Vec<i32> = blogs.iter().map(|b| b.id).collect();

        let categories: HashMap<i32, String> = category::Entity::find()
            .filter(category::Column::Id.is_in(blogs.iter().map(|b| b.category_id)))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let authors = self
            .accounts_by_id(blogs.iter().map(|b| b.author_id).collect())
            .await?;

        let mut images: HashMap<i32, Vec<image::Model>> = HashMap::new();
        for img in image::Entity::find()
            .filter(image::Column::BlogId.is_in(blog_ids.clone()))
            .order_by_asc(image::Column::Id)
            .all(self.conn)
            .await?
        {
            images.entry(img.blog_id).or_default().push(img);
        }

        let comment_counts: HashMap<i32, i64> = comment::Entity::find()
            .select_only()
            .column(comment::Column::BlogId)
            .column_as(comment::Column::Id.count(), "count")
            .filter(comment::Column::BlogId.is_in(blog_ids.clone()))
            .group_by(comment::Column::BlogId)
            .into_tuple::<(i32, i64)>()
            .all(self.conn)
            .await?
            .into_iter()
            .collect();

        let like_counts: HashMap<i32, i64> = like::Entity::find()
            .select_only()
            .column(like::Column::BlogId)
            .column_as(like::Column::AccountId.count(), "count")
            .filter(like::Column::BlogId.is_in(blog_ids))
            .group_by(like::Column::BlogId)
            .into_tuple::<(i32, i64)>()
            .all(self.conn)
            .await?
            .into_iter()
            .collect();

        Ok(blogs
            .into_iter()
            .map(|b| {
                let (author_name, author_username) = names(&authors, b.author_id);
                BlogView {
                    category_name: categories.get(&b.category_id).cloned().unwrap_or_default(),
                    author_name,
                    author_username,
                    images: images.remove(&b.id).unwrap_or_default(),
                    comment_count: comment_counts.get(&b.id).copied().unwrap_or(0) as u64,
                    like_count: like_counts.get(&b.id).copied().unwrap_or(0) as u64,
                    blog: b,
                }
            })
            .collect())
    }

    async fn accounts_by_id(&self, ids: Vec<i32>) -> Result<HashMap<i32, account::Model>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(account::Entity::find()
            .filter(account::Column::Id.is_in(ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect())
    }
}

/// Display name and username of an account, empty if it is gone.
fn names(accounts: &HashMap<i32, account::Model>, id: i32) -> (String, Option<String>) {
    accounts
        .get(&id)
        .map(|a| (a.name.clone(), a.username.clone()))
        .unwrap_or_default()
}
