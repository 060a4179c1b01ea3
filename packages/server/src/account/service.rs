use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    SqlErr, TransactionTrait,
};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::entity::account;
use crate::error::AppError;
use crate::models::account::{RegisterRequest, UpdateAccountRequest};
use crate::models::shared::{normalize_email, validate_password};
use crate::notify::{Notifier, OtpPurpose, dispatch_otp};
use crate::utils::jwt::{self, TokenError, TokenPair};
use crate::utils::hash;

use super::otp::OtpManager;

/// Registration, activation, login and password reset.
///
/// Operations that read-modify-write an account open their own transaction
/// and hold the row lock for its duration.
pub struct AccountService<'a> {
    db: &'a DatabaseConnection,
    auth: &'a AuthConfig,
    notifier: Arc<dyn Notifier>,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a DatabaseConnection, auth: &'a AuthConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, auth, notifier }
    }

    fn session(&self, account_id: i32) -> Result<TokenPair, AppError> {
        Ok(jwt::issue_session(account_id, self.auth)?)
    }

    /// Create an inactive account. No code is sent; the client asks for one.
    pub async fn register(&self, payload: RegisterRequest) -> Result<account::Model, AppError> {
        let email = normalize_email(payload.email.as_deref().unwrap_or_default());
        let username = payload.username.unwrap_or_default().trim().to_string();

        let password = hash::hash_password(&payload.password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

        let model = account::ActiveModel {
            email: Set(email),
            username: Set(Some(username)),
            password: Set(password),
            name: Set(payload.name.trim().to_string()),
            phone: Set(payload.phone.trim().to_string()),
            address: Set(payload.address.trim().to_string()),
            is_active: Set(false),
            is_staff: Set(false),
            is_admin: Set(false),
            is_superuser: Set(false),
            otp: Set(None),
            otp_expires_at: Set(None),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        };

        model.insert(self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                debug!("Registration rejected by unique constraint: {detail}");
                taken_error(&detail)
            }
            _ => AppError::from(e),
        })
    }

    pub async fn request_activation_code(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        let txn = self.db.begin().await?;
        let otp = OtpManager::new(&txn, self.auth.otp_ttl_secs);

        let account = otp.lock_account(&email).await?;
        if account.is_active {
            return Err(AppError::AlreadyActive);
        }
        let message = otp.issue(account, OtpPurpose::Activation).await?;
        txn.commit().await?;

        dispatch_otp(self.notifier.clone(), message);
        Ok(())
    }

    /// Activate the account and open a session for it.
    pub async fn confirm_activation(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(account::Model, TokenPair), AppError> {
        let email = normalize_email(email);
        let txn = self.db.begin().await?;
        let account = OtpManager::new(&txn, self.auth.otp_ttl_secs)
            .verify(&email, code, OtpPurpose::Activation)
            .await?;
        txn.commit().await?;

        info!(account_id = account.id, "Account activated");
        let tokens = self.session(account.id)?;
        Ok((account, tokens))
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        let txn = self.db.begin().await?;
        let otp = OtpManager::new(&txn, self.auth.otp_ttl_secs);

        let account = otp.lock_account(&email).await?;
        let message = otp.issue(account, OtpPurpose::PasswordReset).await?;
        txn.commit().await?;

        dispatch_otp(self.notifier.clone(), message);
        Ok(())
    }

    /// Verify a reset code and return the token that authorizes one password change.
    pub async fn confirm_password_reset_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<String, AppError> {
        let email = normalize_email(email);
        let txn = self.db.begin().await?;
        let account = OtpManager::new(&txn, self.auth.otp_ttl_secs)
            .verify(&email, code, OtpPurpose::PasswordReset)
            .await?;
        txn.commit().await?;

        Ok(jwt::sign_reset(&account.email, code, self.auth)?)
    }

    /// Redeem a reset token. The embedded code must still be the account's
    /// outstanding one; it is cleared here, so each token works once.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let claims = jwt::verify_reset(token, &self.auth.jwt_secret)?;
        validate_password(new_password)?;

        let password = hash::hash_password(new_password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

        let txn = self.db.begin().await?;
        let account = account::Entity::find()
            .filter(account::Column::Email.eq(&claims.email))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::ResetTokenMalformed)?;

        if account.otp.as_deref() != Some(claims.otp.as_str()) {
            return Err(AppError::OtpMismatch);
        }

        let account_id = account.id;
        let mut active: account::ActiveModel = account.into();
        active.password = Set(password);
        active.otp = Set(None);
        active.otp_expires_at = Set(None);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(account_id, "Password reset");
        Ok(())
    }

    /// Password login. A wrong email and a wrong password are
    /// indistinguishable; an inactive account is only revealed to someone
    /// who knows its password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(account::Model, TokenPair), AppError> {
        let account = account::Entity::find()
            .filter(account::Column::Email.eq(normalize_email(email)))
            .one(self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let is_valid = hash::verify_password(password, &account.password)
            .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !account.is_active {
            return Err(AppError::AccountInactive);
        }

        let mut active: account::ActiveModel = account.into();
        active.last_login = Set(Some(Utc::now()));
        let account = active.update(self.db).await?;

        let tokens = self.session(account.id)?;
        Ok((account, tokens))
    }

    /// Rotate a refresh token into a new pair for a still-active account.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let account_id = jwt::verify_refresh(refresh_token, &self.auth.jwt_secret)
            .and_then(|claims| claims.account_id())
            .map_err(|e: TokenError| {
                debug!("Refresh rejected: {e}");
                AppError::TokenInvalid
            })?;

        let active = account::Entity::find_by_id(account_id)
            .one(self.db)
            .await?
            .is_some_and(|a| a.is_active);
        if !active {
            return Err(AppError::TokenInvalid);
        }

        self.session(account_id)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<account::Model, AppError> {
        account::Entity::find()
            .filter(account::Column::Username.eq(username))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account '{username}' not found")))
    }

    /// Apply a partial profile update on behalf of `editor`, who must be the
    /// account itself or an admin.
    pub async fn update_profile(
        &self,
        editor: &account::Model,
        username: &str,
        payload: UpdateAccountRequest,
    ) -> Result<account::Model, AppError> {
        let target = self.find_by_username(username).await?;
        if target.id != editor.id && !(editor.is_admin || editor.is_superuser) {
            return Err(AppError::PermissionDenied);
        }

        let mut active: account::ActiveModel = target.clone().into();
        if let Some(username) = payload.username {
            active.username = Set(Some(username.trim().to_string()));
        }
        if let Some(name) = payload.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = payload.phone {
            active.phone = Set(phone.trim().to_string());
        }
        if let Some(address) = payload.address {
            active.address = Set(address.trim().to_string());
        }

        if !active.is_changed() {
            return Ok(target);
        }

        active.update(self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
            _ => AppError::from(e),
        })
    }
}

/// Which unique field a constraint violation on `account` refers to.
fn taken_error(detail: &str) -> AppError {
    if detail.contains("email") {
        AppError::EmailTaken
    } else {
        AppError::UsernameTaken
    }
}
