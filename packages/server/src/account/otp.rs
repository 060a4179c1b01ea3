use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::sea_query::LockType;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set};

use crate::entity::account;
use crate::error::AppError;
use crate::notify::{OtpMessage, OtpPurpose};

const CODE_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// Draw a uniformly random 6-digit code.
pub fn generate_code() -> String {
    rand::rng().random_range(CODE_RANGE).to_string()
}

/// Check a submitted code against the account's outstanding one.
///
/// A wrong code is reported as `InvalidOtp` even if the stored one has also
/// expired, so expiry is only revealed to someone holding the right code.
pub fn check_code(
    account: &account::Model,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let stored = account.otp.as_deref().ok_or(AppError::InvalidOtp)?;
    if stored != submitted {
        return Err(AppError::InvalidOtp);
    }
    if account.otp_expires_at.is_some_and(|expires| expires <= now) {
        return Err(AppError::OtpExpired);
    }
    Ok(())
}

/// Issues and verifies one-time codes on a single account row.
///
/// Run it on a transaction: lookups take a row lock so issue and verify on
/// the same account are serialized.
pub struct OtpManager<'a, C: ConnectionTrait> {
    conn: &'a C,
    ttl: Duration,
}

impl<'a, C: ConnectionTrait> OtpManager<'a, C> {
    pub fn new(conn: &'a C, ttl_secs: i64) -> Self {
        Self {
            conn,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Load the account for `email` with `SELECT ... FOR UPDATE`.
    pub async fn lock_account(&self, email: &str) -> Result<account::Model, AppError> {
        account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or(AppError::AccountNotFound)
    }

    /// Store a fresh code on the account, replacing any outstanding one.
    ///
    /// Returns the message to dispatch; send it only after the surrounding
    /// transaction commits.
    pub async fn issue(
        &self,
        account: account::Model,
        purpose: OtpPurpose,
    ) -> Result<OtpMessage, AppError> {
        let code = generate_code();
        let to = account.email.clone();

        let mut active: account::ActiveModel = account.into();
        active.otp = Set(Some(code.clone()));
        active.otp_expires_at = Set(Some(Utc::now() + self.ttl));
        active.update(self.conn).await?;

        Ok(OtpMessage { to, code, purpose })
    }

    /// Verify `code` for the account owning `email`.
    ///
    /// Activation requires an inactive account, and on success activates it
    /// and consumes the code. Password-reset verification changes nothing;
    /// the code stays until the reset token built from it is redeemed.
    pub async fn verify(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<account::Model, AppError> {
        let account = self.lock_account(email).await?;

        if purpose == OtpPurpose::Activation && account.is_active {
            return Err(AppError::AlreadyActive);
        }
        check_code(&account, code, Utc::now())?;

        match purpose {
            OtpPurpose::Activation => {
                let mut active: account::ActiveModel = account.into();
                active.is_active = Set(true);
                active.otp = Set(None);
                active.otp_expires_at = Set(None);
                Ok(active.update(self.conn).await?)
            }
            OtpPurpose::PasswordReset => Ok(account),
        }
    }
}
