//! Database operations for `contact_search_caches`.

use leadscan_core::FoundContact;
use sqlx::PgPool;

use crate::{days_param, DbError};

/// Contacts found for `(domain, department)` within the last
/// `max_age_days`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::Json`] if the
/// cached payload does not decode.
pub async fn find_recent_contact_search(
    pool: &PgPool,
    domain: &str,
    department: &str,
    max_age_days: u32,
) -> Result<Option<Vec<FoundContact>>, DbError> {
    let contacts = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT contacts FROM contact_search_caches \
         WHERE domain = $1 AND department = $2 \
           AND searched_at >= NOW() - make_interval(days => $3) \
           AND searched_at <= NOW()",
    )
    .bind(domain)
    .bind(department)
    .bind(days_param(max_age_days))
    .fetch_optional(pool)
    .await?;

    contacts
        .map(serde_json::from_value::<Vec<FoundContact>>)
        .transpose()
        .map_err(DbError::from)
}

/// # Errors
///
/// Returns [`DbError::Json`] if the contacts cannot be encoded or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn save_contact_search(
    pool: &PgPool,
    domain: &str,
    department: &str,
    contacts: &[FoundContact],
) -> Result<(), DbError> {
    let payload = serde_json::to_value(contacts)?;

    sqlx::query(
        "INSERT INTO contact_search_caches (domain, department, contacts, searched_at) \
         VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (domain, department) DO UPDATE SET \
           contacts = EXCLUDED.contacts, \
           searched_at = EXCLUDED.searched_at",
    )
    .bind(domain)
    .bind(department)
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(())
}
