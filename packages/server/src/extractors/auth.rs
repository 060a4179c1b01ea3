use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entity::account;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated account extracted from the `Authorization: Bearer <token>` header.
///
/// Only access tokens are accepted; refresh and password-reset tokens are
/// rejected with `TOKEN_INVALID`.
pub struct AuthUser {
    pub account_id: i32,
}

impl AuthUser {
    /// Load the caller's account. A token for a vanished or deactivated
    /// account is treated as invalid.
    pub async fn account<C: ConnectionTrait>(&self, db: &C) -> Result<account::Model, AppError> {
        account::Entity::find_by_id(self.account_id)
            .one(db)
            .await?
            .filter(|a| a.is_active)
            .ok_or(AppError::TokenInvalid)
    }

    /// Load the caller's account and require staff privileges.
    pub async fn require_staff<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<account::Model, AppError> {
        let account = self.account(db).await?;
        if account.is_staff || account.is_admin || account.is_superuser {
            Ok(account)
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify_access(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;
        let account_id = claims.account_id().map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser { account_id })
    }
}
