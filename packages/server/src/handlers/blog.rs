use axum::extract::{DefaultBodyLimit, Multipart, Path, State, multipart::Field};
use axum::{Json, http::StatusCode, response::IntoResponse};
use common::media::{MediaError, image_content_type};
use tracing::instrument;

use crate::blog::{BlogChanges, BlogFilter, BlogService, CommentView, NewBlog, NewImage};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::blog::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Room for several images per request on top of the per-image limit.
pub fn blog_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max((max_image_size as usize).saturating_mul(8).saturating_add(1024 * 1024))
}

/// Text and image fields of a blog create/update form.
#[derive(Default)]
struct BlogForm {
    title: Option<String>,
    body: Option<String>,
    category: Option<String>,
    slug: Option<String>,
    images: Vec<NewImage>,
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))
}

/// Parse the multipart form. Images are type- and size-checked here but only
/// written to the media store by the service, once the write is accepted.
async fn read_blog_form(state: &AppState, mut multipart: Multipart) -> Result<BlogForm, AppError> {
    let mut form = BlogForm::default();
    let max_size = state.config.storage.max_image_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("title") => form.title = Some(read_text(field, "title").await?),
            Some("body") => form.body = Some(read_text(field, "body").await?),
            Some("category") => form.category = Some(read_text(field, "category").await?),
            Some("slug") => form.slug = Some(read_text(field, "slug").await?),
            Some("images") => {
                let filename = field
                    .file_name()
                    .and_then(|name| name.rsplit(['/', '\\']).next())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;
                let content_type = image_content_type(&filename)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
                if data.len() as u64 > max_size {
                    return Err(MediaError::SizeLimitExceeded {
                        actual: data.len() as u64,
                        limit: max_size,
                    }
                    .into());
                }

                form.images.push(NewImage {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

/// Treat `?category=` like an absent filter.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// List blogs.
#[utoipa::path(
    get,
    path = "/blogs/",
    tag = "Blogs",
    operation_id = "listBlogs",
    summary = "List blogs",
    description = "Returns blogs newest first. `category` (exact name) and `username` (author) \
        filters are combined with AND.",
    params(ListBlogsParams),
    responses(
        (status = 200, description = "Page of blogs", body = BlogListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListBlogsParams>,
) -> Result<Json<BlogListResponse>, AppError> {
    let (limit, offset) = Pagination::window(params.limit, params.offset);
    let filter = BlogFilter {
        category: non_empty(params.category),
        username: non_empty(params.username),
    };

    let (views, total) = BlogService::new(&state.db).list(filter, limit, offset).await?;
    let media_url = &state.config.storage.media_url;

    Ok(Json(BlogListResponse {
        data: views
            .into_iter()
            .map(|v| BlogResponse::from_view(v, media_url))
            .collect(),
        pagination: Pagination {
            limit,
            offset,
            total,
        },
    }))
}

/// Create a blog.
#[utoipa::path(
    post,
    path = "/blogs/",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Create a blog",
    description = "Multipart form with `title`, `body`, `category` (name), optional `slug`, and any \
        number of `images` files. Without a slug one is derived from the title.",
    request_body(content_type = "multipart/form-data", description = "Blog fields and image files"),
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "VALIDATION_ERROR or SLUG_TAKEN", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(account_id = auth_user.account_id))]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let author = auth_user.account(&state.db).await?;
    let form = read_blog_form(&state, multipart).await?;

    let title = form
        .title
        .ok_or_else(|| AppError::Validation("Missing 'title' field".into()))?;
    validate_title(&title)?;
    let body = form
        .body
        .ok_or_else(|| AppError::Validation("Missing 'body' field".into()))?;
    let category = form
        .category
        .ok_or_else(|| AppError::Validation("Missing 'category' field".into()))?;

    let service = BlogService::new(&state.db);
    let created = service
        .create(
            state.media.as_ref(),
            author.id,
            NewBlog {
                title,
                body,
                category,
                slug: form.slug,
                images: form.images,
            },
        )
        .await?;
    let view = service.view(created).await?;

    Ok((
        StatusCode::CREATED,
        Json(BlogResponse::from_view(view, &state.config.storage.media_url)),
    ))
}

/// Get a blog with its comments.
#[utoipa::path(
    get,
    path = "/blogs/b/{slug}/",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Get a blog",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Blog details", body = BlogDetailResponse),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogDetailResponse>, AppError> {
    let (view, comments) = BlogService::new(&state.db).detail(&slug).await?;

    Ok(Json(BlogDetailResponse {
        blog: BlogResponse::from_view(view, &state.config.storage.media_url),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// Update a blog.
#[utoipa::path(
    put,
    path = "/blogs/b/{slug}/",
    tag = "Blogs",
    operation_id = "updateBlog",
    summary = "Update a blog",
    description = "Multipart form; every field is optional. New `images` are attached alongside \
        the existing ones. Only the author may update a blog; the slug never changes.",
    params(("slug" = String, Path, description = "Blog slug")),
    request_body(content_type = "multipart/form-data", description = "Changed fields and new image files"),
    responses(
        (status = 200, description = "Updated blog", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(account_id = auth_user.account_id))]
pub async fn update_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<Json<BlogResponse>, AppError> {
    let editor = auth_user.account(&state.db).await?;
    let form = read_blog_form(&state, multipart).await?;

    if let Some(title) = &form.title {
        validate_title(title)?;
    }

    let service = BlogService::new(&state.db);
    let updated = service
        .update(
            state.media.as_ref(),
            &slug,
            editor.id,
            BlogChanges {
                title: form.title,
                body: form.body,
                category: form.category,
                images: form.images,
            },
        )
        .await?;
    let view = service.view(updated).await?;

    Ok(Json(BlogResponse::from_view(
        view,
        &state.config.storage.media_url,
    )))
}

/// Delete a blog.
#[utoipa::path(
    delete,
    path = "/blogs/b/{slug}/",
    tag = "Blogs",
    operation_id = "deleteBlog",
    summary = "Delete a blog",
    description = "Deletes the blog with its images, comments and likes. Author only.",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn delete_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let requester = auth_user.account(&state.db).await?;
    BlogService::new(&state.db)
        .delete(&slug, requester.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Like or unlike a blog.
#[utoipa::path(
    post,
    path = "/blogs/b/{slug}/like/",
    tag = "Blogs",
    operation_id = "toggleLike",
    summary = "Toggle a like",
    description = "Removes the caller's like if present, otherwise adds it.",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeToggleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn toggle_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LikeToggleResponse>, AppError> {
    let account = auth_user.account(&state.db).await?;
    let liked = BlogService::new(&state.db)
        .toggle_like(&slug, account.id)
        .await?;
    Ok(Json(LikeToggleResponse { liked }))
}

/// List who likes a blog.
#[utoipa::path(
    get,
    path = "/blogs/b/{slug}/likes/",
    tag = "Blogs",
    operation_id = "listLikes",
    summary = "List likes of a blog",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Likes, most recent first", body = Vec<LikeResponse>),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_likes(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<LikeResponse>>, AppError> {
    let likes = BlogService::new(&state.db).likes(&slug).await?;
    Ok(Json(likes.into_iter().map(Into::into).collect()))
}

/// Comment on a blog.
#[utoipa::path(
    post,
    path = "/blogs/b/{slug}/comment/",
    tag = "Blogs",
    operation_id = "addComment",
    summary = "Add a comment",
    params(("slug" = String, Path, description = "Blog slug")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(account_id = auth_user.account_id))]
pub async fn add_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    validate_comment(&payload.comment)?;

    let author = auth_user.account(&state.db).await?;
    let comment = BlogService::new(&state.db)
        .add_comment(&slug, author.id, &payload.comment)
        .await?;

    Ok(Json(
        CommentView {
            comment,
            author_name: author.name,
            author_username: author.username,
        }
        .into(),
    ))
}
