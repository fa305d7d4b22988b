//! Database operations for `company_scans`, the raw collect snapshots.

use chrono::{DateTime, Utc};
use leadscan_core::CompanyScanRawData;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `company_scans` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyScanRow {
    pub company_domain: String,
    pub department: String,
    pub company_id: Uuid,
    pub raw_json: serde_json::Value,
    pub collected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store the snapshot for `(raw.company.domain, raw.department)`, replacing
/// any previous one.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the snapshot cannot be encoded or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn save_company_scan(pool: &PgPool, raw: &CompanyScanRawData) -> Result<(), DbError> {
    let raw_json = serde_json::to_value(raw)?;

    sqlx::query(
        "INSERT INTO company_scans \
           (company_domain, department, company_id, raw_json, collected_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (company_domain, department) DO UPDATE SET \
           company_id = EXCLUDED.company_id, \
           raw_json = EXCLUDED.raw_json, \
           collected_at = EXCLUDED.collected_at, \
           updated_at = NOW()",
    )
    .bind(&raw.company.domain)
    .bind(&raw.department)
    .bind(raw.company_id)
    .bind(raw_json)
    .bind(raw.collected_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the snapshot for `(domain, department)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::Json`] if the
/// stored snapshot does not decode.
pub async fn load_company_scan(
    pool: &PgPool,
    domain: &str,
    department: &str,
) -> Result<Option<CompanyScanRawData>, DbError> {
    let row = sqlx::query_as::<_, CompanyScanRow>(
        "SELECT company_domain, department, company_id, raw_json, collected_at, updated_at \
         FROM company_scans \
         WHERE company_domain = $1 AND department = $2",
    )
    .bind(domain)
    .bind(department)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(serde_json::from_value(row.raw_json)?)),
        None => Ok(None),
    }
}
