//! Database operations for the `email_verifications` cache.

use chrono::{DateTime, Utc};
use leadscan_core::{EmailVerificationResult, VerificationDetails};
use sqlx::PgPool;

use crate::{days_param, DbError};

/// A row from the `email_verifications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailVerificationRow {
    pub email: String,
    pub source: String,
    pub is_deliverable: bool,
    pub has_mx_records: bool,
    pub reason: Option<String>,
    /// Source-tagged [`VerificationDetails`].
    pub details: serde_json::Value,
    pub verified_at: DateTime<Utc>,
}

impl EmailVerificationRow {
    /// # Errors
    ///
    /// Returns [`DbError::Json`] if `details` does not decode.
    pub fn into_result(self) -> Result<EmailVerificationResult, DbError> {
        let details: VerificationDetails = serde_json::from_value(self.details)?;
        Ok(EmailVerificationResult {
            email: self.email,
            is_deliverable: self.is_deliverable,
            has_mx_records: self.has_mx_records,
            reason: self.reason,
            details,
        })
    }
}

/// Returns the cached verdict for `email` when it was recorded within the
/// last `max_age_days` and not in the future.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::Json`] if the
/// stored details are malformed.
pub async fn find_recent_verification(
    pool: &PgPool,
    email: &str,
    max_age_days: u32,
) -> Result<Option<EmailVerificationResult>, DbError> {
    let row = sqlx::query_as::<_, EmailVerificationRow>(
        "SELECT email, source, is_deliverable, has_mx_records, reason, details, verified_at \
         FROM email_verifications \
         WHERE email = $1 \
           AND verified_at >= NOW() - make_interval(days => $2) \
           AND verified_at <= NOW()",
    )
    .bind(email)
    .bind(days_param(max_age_days))
    .fetch_optional(pool)
    .await?;

    row.map(EmailVerificationRow::into_result).transpose()
}

/// Insert or replace the verdict for `result.email`, stamping it with the
/// current time.
///
/// # Errors
///
/// Returns [`DbError::Json`] if details cannot be encoded or
/// [`DbError::Sqlx`] on query failure.
pub async fn upsert_verification(
    pool: &PgPool,
    result: &EmailVerificationResult,
) -> Result<(), DbError> {
    let details = serde_json::to_value(&result.details)?;

    sqlx::query(
        "INSERT INTO email_verifications \
           (email, source, is_deliverable, has_mx_records, reason, details, verified_at) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
         ON CONFLICT (email) DO UPDATE SET \
           source = EXCLUDED.source, \
           is_deliverable = EXCLUDED.is_deliverable, \
           has_mx_records = EXCLUDED.has_mx_records, \
           reason = EXCLUDED.reason, \
           details = EXCLUDED.details, \
           verified_at = EXCLUDED.verified_at",
    )
    .bind(&result.email)
    .bind(result.source().as_str())
    .bind(result.is_deliverable)
    .bind(result.has_mx_records)
    .bind(result.reason.as_deref())
    .bind(details)
    .execute(pool)
    .await?;

    Ok(())
}
