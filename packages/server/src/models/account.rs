use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::account;
use crate::error::AppError;

use super::shared::{validate_email, validate_length, validate_password};

/// Request body for account registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Login email, unique across accounts.
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    /// Public handle, unique across accounts (max 40 characters).
    #[schema(example = "alice")]
    pub username: Option<String>,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Display name.
    #[schema(example = "Alice Liddell")]
    #[serde(default)]
    pub name: String,
    #[schema(example = "5550100")]
    #[serde(default)]
    pub phone: String,
    #[schema(example = "1 Rabbit Hole")]
    #[serde(default)]
    pub address: String,
}

/// Profile limits shared by registration and profile updates.
fn validate_profile(
    username: Option<&str>,
    name: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) -> Result<(), AppError> {
    if let Some(username) = username {
        validate_length("Username", username, 1, 40)?;
    }
    if let Some(name) = name {
        validate_length("Name", name, 0, 40)?;
    }
    if let Some(phone) = phone {
        validate_length("Phone", phone, 0, 10)?;
    }
    if let Some(address) = address {
        validate_length("Address", address, 0, 100)?;
    }
    Ok(())
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let email = payload
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Users must have an email address".into()))?;
    validate_email(email)?;

    let username = payload
        .username
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Users must have a username".into()))?;

    validate_profile(
        Some(username),
        Some(&payload.name),
        Some(&payload.phone),
        Some(&payload.address),
    )?;
    validate_password(&payload.password)
}

/// Public view of an account. Never carries the password hash or OTP.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "Alice Liddell")]
    pub name: String,
    pub phone: String,
    pub address: String,
    #[schema(example = false)]
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<account::Model> for AccountResponse {
    fn from(a: account::Model) -> Self {
        Self {
            id: a.id,
            email: a.email,
            username: a.username,
            name: a.name,
            phone: a.phone,
            address: a.address,
            is_active: a.is_active,
            date_joined: a.date_joined,
            last_login: a.last_login,
        }
    }
}

/// `?email=` query of the OTP request endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct EmailQuery {
    /// Email of the account to send the code to.
    #[param(example = "alice@example.com")]
    pub email: String,
}

/// Request body for both OTP verification endpoints.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct VerifyOtpRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// 6-digit code from the mail.
    #[schema(example = "493028")]
    pub otp: String,
}

/// Session issued after login or activation.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SessionResponse {
    /// Bearer access token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    /// Refresh token for `POST /accounts/token/refresh/`.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh: String,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "Alice Liddell")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
}

/// Reset authorization returned after reset-OTP verification.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResetTokenResponse {
    #[schema(example = "OTP verified successfully")]
    pub message: String,
    /// Token to present to `POST /accounts/reset-password/`.
    pub token: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    /// Reset token from the verification step.
    pub token: String,
    /// New password (8-128 characters).
    #[schema(example = "n3w_P@ssword")]
    pub password: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    /// A refresh token from login, activation, or a previous refresh.
    pub refresh: String,
}

/// Rotated token pair.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct RefreshResponse {
    pub access: String,
    pub refresh: String,
}

/// Partial profile update. Absent fields are left unchanged; email and
/// password cannot be changed here.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    #[schema(example = "alice2")]
    pub username: Option<String>,
    #[schema(example = "Alice L.")]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub fn validate_update_account(payload: &UpdateAccountRequest) -> Result<(), AppError> {
    validate_profile(
        payload.username.as_deref(),
        payload.name.as_deref(),
        payload.phone.as_deref(),
        payload.address.as_deref(),
    )
}
