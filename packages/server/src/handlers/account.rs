use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::account::AccountService;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::account::*;
use crate::models::shared::MessageResponse;
use crate::state::AppState;

fn account_service(state: &AppState) -> AccountService<'_> {
    AccountService::new(&state.db, &state.config.auth, state.notifier.clone())
}

/// Register an inactive account.
#[utoipa::path(
    post,
    path = "/accounts/register/",
    tag = "Accounts",
    operation_id = "register",
    summary = "Register a new account",
    description = "Creates an inactive account. Activate it by requesting a code with \
        `GET /accounts/send-register-otp/` and confirming it.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, EMAIL_TAKEN, USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = ?payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let account = account_service(&state).register(payload).await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Send an activation code.
#[utoipa::path(
    get,
    path = "/accounts/send-register-otp/",
    tag = "Accounts",
    operation_id = "sendRegisterOtp",
    summary = "Send an activation code",
    description = "Mails a fresh 6-digit code to an inactive account, replacing any earlier one.",
    params(EmailQuery),
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "ACCOUNT_NOT_FOUND or ALREADY_ACTIVE", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn send_register_otp(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    account_service(&state)
        .request_activation_code(&query.email)
        .await?;
    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

/// Activate an account with its code.
#[utoipa::path(
    post,
    path = "/accounts/verify-register-otp/",
    tag = "Accounts",
    operation_id = "verifyRegisterOtp",
    summary = "Activate an account",
    description = "Checks the activation code. On success the account becomes active, the code \
        is consumed, and a session is returned.",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account activated", body = SessionResponse),
        (status = 400, description = "ACCOUNT_NOT_FOUND, ALREADY_ACTIVE, INVALID_OTP or OTP_EXPIRED", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn verify_register_otp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (account, tokens) = account_service(&state)
        .confirm_activation(&payload.email, &payload.otp)
        .await?;

    Ok(Json(SessionResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        username: account.username,
        name: account.name,
        email: account.email,
    }))
}

/// Send a password-reset code.
#[utoipa::path(
    get,
    path = "/accounts/send-reset-password-otp/",
    tag = "Accounts",
    operation_id = "sendResetPasswordOtp",
    summary = "Send a password-reset code",
    params(EmailQuery),
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "ACCOUNT_NOT_FOUND", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn send_reset_password_otp(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    account_service(&state)
        .request_password_reset(&query.email)
        .await?;
    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

/// Exchange a reset code for a reset token.
#[utoipa::path(
    post,
    path = "/accounts/verify-reset-password-otp/",
    tag = "Accounts",
    operation_id = "verifyResetPasswordOtp",
    summary = "Verify a password-reset code",
    description = "Returns a short-lived token authorizing one password change.",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted", body = ResetTokenResponse),
        (status = 400, description = "ACCOUNT_NOT_FOUND, INVALID_OTP or OTP_EXPIRED", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn verify_reset_password_otp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let token = account_service(&state)
        .confirm_password_reset_otp(&payload.email, &payload.otp)
        .await?;

    Ok(Json(ResetTokenResponse {
        message: "OTP verified successfully".into(),
        token,
    }))
}

/// Set a new password with a reset token.
#[utoipa::path(
    post,
    path = "/accounts/reset-password/",
    tag = "Accounts",
    operation_id = "resetPassword",
    summary = "Reset the password",
    description = "Redeems a reset token. Each token works once.",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "TOKEN_EXPIRED, TOKEN_MALFORMED, OTP_MISMATCH or VALIDATION_ERROR", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    account_service(&state)
        .reset_password(&payload.token, &payload.password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/accounts/login/",
    tag = "Accounts",
    operation_id = "login",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account not activated (ACCOUNT_INACTIVE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    validate_login_request(&payload)?;

    let (account, tokens) = account_service(&state)
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(SessionResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        username: account.username,
        name: account.name,
        email: account.email,
    }))
}

/// Rotate a refresh token.
#[utoipa::path(
    post,
    path = "/accounts/token/refresh/",
    tag = "Accounts",
    operation_id = "refreshToken",
    summary = "Refresh the session",
    description = "Returns a new access and refresh token. The presented refresh token is not revoked.",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let tokens = account_service(&state).refresh(&payload.refresh).await?;
    Ok(Json(RefreshResponse {
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}

/// Get an account by username.
#[utoipa::path(
    get,
    path = "/accounts/{username}/",
    tag = "Accounts",
    operation_id = "getAccount",
    summary = "Get an account",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 404, description = "No such account (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service(&state).find_by_username(&username).await?;
    Ok(Json(account.into()))
}

/// Update an account profile.
#[utoipa::path(
    put,
    path = "/accounts/{username}/",
    tag = "Accounts",
    operation_id = "updateAccount",
    summary = "Update a profile",
    description = "Partially updates username, name, phone and address. Email and password \
        cannot be changed here. Only the account itself or an admin may update it.",
    params(("username" = String, Path, description = "Account username")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "VALIDATION_ERROR or USERNAME_TAKEN", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No such account (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(account_id = auth_user.account_id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    validate_update_account(&payload)?;

    let editor = auth_user.account(&state.db).await?;
    let account = account_service(&state)
        .update_profile(&editor, &username, payload)
        .await?;
    Ok(Json(account.into()))
}
