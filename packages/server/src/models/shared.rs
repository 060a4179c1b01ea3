use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Maximum number of items in this page.
    #[schema(example = 10)]
    pub limit: u64,
    /// Number of items skipped before this page.
    #[schema(example = 0)]
    pub offset: u64,
    /// Total number of matching items.
    #[schema(example = 47)]
    pub total: u64,
}

impl Pagination {
    /// Clamp raw query values: limit defaults to 10 and is capped at 100.
    pub fn window(limit: Option<u64>, offset: Option<u64>) -> (u64, u64) {
        (
            limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset.unwrap_or(0),
        )
    }
}

/// Plain acknowledgement body.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "OTP sent successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Require a trimmed value with a character count in `min..=max`.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let count = value.trim().chars().count();
    if count < min || count > max {
        let message = if min == 0 {
            format!("{field} must be at most {max} characters")
        } else {
            format!("{field} must be {min}-{max} characters")
        };
        return Err(AppError::Validation(message));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, a non-empty local part, and a
/// dotted domain without whitespace.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid || email.chars().count() > 254 {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

/// Lowercased, trimmed email used as the lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}
