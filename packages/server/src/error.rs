use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::MediaError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::utils::jwt::TokenError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `EMAIL_TAKEN`,
    /// `USERNAME_TAKEN`, `SLUG_TAKEN`, `NAME_TAKEN`, `ACCOUNT_NOT_FOUND`,
    /// `ALREADY_ACTIVE`, `INVALID_OTP`, `OTP_EXPIRED`, `OTP_MISMATCH`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `TOKEN_EXPIRED`, `TOKEN_MALFORMED`,
    /// `INVALID_CREDENTIALS`, `ACCOUNT_INACTIVE`, `PERMISSION_DENIED`,
    /// `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must be 1-100 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    EmailTaken,
    UsernameTaken,
    SlugTaken,
    /// A category with this name (or derived slug) already exists.
    NameTaken,
    /// No account for the email given to an OTP or password-reset step.
    AccountNotFound,
    AlreadyActive,
    InvalidOtp,
    OtpExpired,
    /// Reset token carries a code that is no longer the account's current one.
    OtpMismatch,
    /// Session token absent from the request.
    TokenMissing,
    /// Session token failed verification or has the wrong type.
    TokenInvalid,
    /// Password-reset token is past its lifetime.
    ResetTokenExpired,
    /// Password-reset token could not be decoded or its signature is wrong.
    ResetTokenMalformed,
    InvalidCredentials,
    AccountInactive,
    PermissionDenied,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::EmailTaken => (
                StatusCode::BAD_REQUEST,
                "EMAIL_TAKEN",
                "An account with this email already exists".into(),
            ),
            AppError::UsernameTaken => (
                StatusCode::BAD_REQUEST,
                "USERNAME_TAKEN",
                "Username is already taken".into(),
            ),
            AppError::SlugTaken => (
                StatusCode::BAD_REQUEST,
                "SLUG_TAKEN",
                "A blog with this slug already exists".into(),
            ),
            AppError::NameTaken => (
                StatusCode::BAD_REQUEST,
                "NAME_TAKEN",
                "A category with this name already exists".into(),
            ),
            AppError::AccountNotFound => (
                StatusCode::BAD_REQUEST,
                "ACCOUNT_NOT_FOUND",
                "Account does not exist".into(),
            ),
            AppError::AlreadyActive => (
                StatusCode::BAD_REQUEST,
                "ALREADY_ACTIVE",
                "Account is already active".into(),
            ),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "INVALID_OTP", "Invalid OTP".into()),
            AppError::OtpExpired => (
                StatusCode::BAD_REQUEST,
                "OTP_EXPIRED",
                "OTP has expired, request a new one".into(),
            ),
            AppError::OtpMismatch => (
                StatusCode::BAD_REQUEST,
                "OTP_MISMATCH",
                "Reset token has already been used or superseded".into(),
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication required".into(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
            ),
            AppError::ResetTokenExpired => (
                StatusCode::BAD_REQUEST,
                "TOKEN_EXPIRED",
                "Token expired".into(),
            ),
            AppError::ResetTokenMalformed => (
                StatusCode::BAD_REQUEST,
                "TOKEN_MALFORMED",
                "Invalid token".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".into(),
            ),
            AppError::AccountInactive => (
                StatusCode::FORBIDDEN,
                "ACCOUNT_INACTIVE",
                "Account has not been activated".into(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "Insufficient permissions".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                )
            }
        };
        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType(detail) => {
                AppError::Validation(format!("Images must be image files, got {detail}"))
            }
            MediaError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("Images must be at most {limit} bytes"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Conversion used on the password-reset path. Session-token failures are
/// mapped to `TokenInvalid` by the auth extractor instead.
impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::ResetTokenExpired,
            TokenError::Malformed(_) | TokenError::WrongType => AppError::ResetTokenMalformed,
            TokenError::Signing(detail) => AppError::Internal(format!("JWT sign error: {detail}")),
        }
    }
}
