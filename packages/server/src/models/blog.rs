use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blog::{BlogView, CommentView, LikeView};
use crate::entity::image;
use crate::error::AppError;

use super::shared::{Pagination, validate_length};

/// Query parameters for listing blogs.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListBlogsParams {
    /// Only blogs in the category with this exact name.
    #[param(example = "Tech")]
    pub category: Option<String>,
    /// Only blogs written by the account with this username.
    #[param(example = "alice")]
    pub username: Option<String>,
    /// Items per page (1-100, default 10).
    #[param(example = 10)]
    pub limit: Option<u64>,
    /// Items to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    validate_length("Title", title, 1, 100)
}

pub fn validate_comment(comment: &str) -> Result<(), AppError> {
    validate_length("Comment", comment, 1, 200)
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageResponse {
    #[schema(example = 3)]
    pub id: i32,
    /// Public URL of the stored file.
    #[schema(example = "/media/ab/cdef0123.png")]
    pub image_url: String,
    #[schema(example = "cover.png")]
    pub filename: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    #[schema(example = 20480)]
    pub size: i64,
}

impl ImageResponse {
    pub fn from_model(img: image::Model, media_url: &str) -> Self {
        Self {
            id: img.id,
            image_url: format!("{}/{}", media_url.trim_end_matches('/'), img.storage_key),
            filename: img.filename,
            content_type: img.content_type,
            size: img.size,
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CommentResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Nice write-up!")]
    pub comment: String,
    pub commented_at: DateTime<Utc>,
    /// Display name of the commenter.
    #[schema(example = "Bob")]
    pub commented_by: String,
    #[schema(example = "bob")]
    pub commented_by_username: Option<String>,
}

impl From<CommentView> for CommentResponse {
    fn from(v: CommentView) -> Self {
        Self {
            id: v.comment.id,
            comment: v.comment.comment,
            commented_at: v.comment.commented_at,
            commented_by: v.author_name,
            commented_by_username: v.author_username,
        }
    }
}

/// Blog as shown in lists.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct BlogResponse {
    #[schema(example = 5)]
    pub id: i32,
    #[schema(example = "hello-world")]
    pub slug: String,
    /// Category name.
    #[schema(example = "Tech")]
    pub category: String,
    #[schema(example = "Hello World")]
    pub title: String,
    /// Author display name.
    #[schema(example = "Alice Liddell")]
    pub author: String,
    #[schema(example = "alice")]
    pub author_username: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub body: String,
    pub images: Vec<ImageResponse>,
    #[schema(example = 2)]
    pub comment_count: u64,
    #[schema(example = 7)]
    pub like_count: u64,
}

impl BlogResponse {
    pub fn from_view(v: BlogView, media_url: &str) -> Self {
        Self {
            id: v.blog.id,
            slug: v.blog.slug.unwrap_or_default(),
            category: v.category_name,
            title: v.blog.title,
            author: v.author_name,
            author_username: v.author_username,
            pub_date: v.blog.pub_date,
            body: v.blog.body,
            images: v
                .images
                .into_iter()
                .map(|img| ImageResponse::from_model(img, media_url))
                .collect(),
            comment_count: v.comment_count,
            like_count: v.like_count,
        }
    }
}

/// Blog with its comments, oldest first.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct BlogDetailResponse {
    #[serde(flatten)]
    pub blog: BlogResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BlogListResponse {
    pub data: Vec<BlogResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text (1-200 characters).
    #[schema(example = "Nice write-up!")]
    pub comment: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LikeToggleResponse {
    /// Whether the caller likes the blog after the toggle.
    #[schema(example = true)]
    pub liked: bool,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LikeResponse {
    #[schema(example = "Bob")]
    pub name: String,
    #[schema(example = "bob")]
    pub username: Option<String>,
    pub liked_at: DateTime<Utc>,
}

impl From<LikeView> for LikeResponse {
    fn from(v: LikeView) -> Self {
        Self {
            name: v.name,
            username: v.username,
            liked_at: v.liked_at,
        }
    }
}
