use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::blog::CategoryService;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::state::AppState;

/// List categories.
#[utoipa::path(
    get,
    path = "/blogs/categories/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Most recently active categories first.",
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = CategoryService::new(&state.db).list().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/blogs/categories/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Staff only. The slug is derived from the name.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "VALIDATION_ERROR or NAME_TAKEN", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff(&state.db).await?;
    let slug = validate_category_name(&payload.name)?;

    let category = CategoryService::new(&state.db)
        .create(payload, slug)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// Get a category.
#[utoipa::path(
    get,
    path = "/blogs/categories/{id}/",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = CategoryService::new(&state.db).get(id).await?;
    Ok(Json(category.into()))
}

/// Update a category.
#[utoipa::path(
    put,
    path = "/blogs/categories/{id}/",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Staff only. Renaming re-derives the slug.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "VALIDATION_ERROR or NAME_TAKEN", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    auth_user.require_staff(&state.db).await?;
    let slug = payload
        .name
        .as_deref()
        .map(validate_category_name)
        .transpose()?;

    let category = CategoryService::new(&state.db)
        .update(id, payload, slug)
        .await?;
    Ok(Json(category.into()))
}

/// Delete a category.
#[utoipa::path(
    delete,
    path = "/blogs/categories/{id}/",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Staff only. Deletes every blog in the category as well.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_staff(&state.db).await?;
    CategoryService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
