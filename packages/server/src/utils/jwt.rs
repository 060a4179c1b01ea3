use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token is not of the expected type")]
    WrongType,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Purpose a token was minted for. Embedded as the `typ` claim so that one
/// kind can never be replayed where another is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    PasswordReset,
}

trait Typed {
    fn token_type(&self) -> TokenType;
}

/// Claims of access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // Account ID
    pub typ: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn account_id(&self) -> Result<i32, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Malformed("subject is not an account id".into()))
    }
}

impl Typed for SessionClaims {
    fn token_type(&self) -> TokenType {
        self.typ
    }
}

/// Claims of a password-reset authorization token.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub otp: String,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Typed for ResetClaims {
    fn token_type(&self) -> TokenType {
        self.typ
    }
}

/// Access/refresh pair handed out at login and activation.
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

fn verify<C: DeserializeOwned + Typed>(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(e.to_string()),
    })?;

    if data.claims.token_type() != expected {
        return Err(TokenError::WrongType);
    }
    Ok(data.claims)
}

fn session_claims(account_id: i32, typ: TokenType, ttl_secs: i64) -> SessionClaims {
    let now = Utc::now();
    SessionClaims {
        sub: account_id.to_string(),
        typ,
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    }
}

/// Sign a new access/refresh pair for an account.
pub fn issue_session(account_id: i32, auth: &AuthConfig) -> Result<TokenPair, TokenError> {
    let access = session_claims(account_id, TokenType::Access, auth.access_token_ttl_secs);
    let refresh = session_claims(account_id, TokenType::Refresh, auth.refresh_token_ttl_secs);
    Ok(TokenPair {
        access: sign(&access, &auth.jwt_secret)?,
        refresh: sign(&refresh, &auth.jwt_secret)?,
    })
}

/// Verify a bearer access token.
pub fn verify_access(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    verify(token, secret, TokenType::Access)
}

/// Verify a refresh token presented for rotation.
///
/// Rotation signs a brand-new pair; the presented refresh token is not
/// revoked and stays valid until it expires.
pub fn verify_refresh(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    verify(token, secret, TokenType::Refresh)
}

/// Sign a single-purpose token authorizing one password change for `email`.
pub fn sign_reset(email: &str, otp: &str, auth: &AuthConfig) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = ResetClaims {
        email: email.to_owned(),
        otp: otp.to_owned(),
        typ: TokenType::PasswordReset,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(auth.reset_token_ttl_secs)).timestamp(),
    };
    sign(&claims, &auth.jwt_secret)
}

pub fn verify_reset(token: &str, secret: &str) -> Result<ResetClaims, TokenError> {
    verify(token, secret, TokenType::PasswordReset)
}
