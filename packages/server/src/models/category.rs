use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::category;
use crate::error::AppError;
use crate::utils::slug::slugify;

use super::shared::validate_length;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    /// Unique name (1-255 characters). The slug is derived from it.
    #[schema(example = "Tech")]
    pub name: String,
    #[schema(example = "Hardware, software and everything between")]
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    #[schema(example = "Technology")]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Validate a category name and return its derived slug.
pub fn validate_category_name(name: &str) -> Result<String, AppError> {
    validate_length("Name", name, 1, 255)?;
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Name must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Tech")]
    pub name: String,
    #[schema(example = "tech")]
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Advances whenever a blog in this category is created or updated.
    pub modified_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(c: category::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            created_at: c.created_at,
            modified_at: c.modified_at,
        }
    }
}
