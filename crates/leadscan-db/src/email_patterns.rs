//! Database operations for `email_patterns`: per-company decision records
//! and the per-domain learning ledger.

use chrono::{DateTime, Utc};
use leadscan_core::{EmailPattern, EmailPatternRecord, PatternSource};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{days_param, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `email_patterns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailPatternRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub pattern: String,
    pub reason: String,
    pub domain: Option<String>,
    pub source: Option<String>,
    pub sample_email: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub success_count: Option<i64>,
    pub total_count: Option<i64>,
}

impl TryFrom<EmailPatternRow> for EmailPatternRecord {
    type Error = DbError;

    fn try_from(row: EmailPatternRow) -> Result<Self, Self::Error> {
        let pattern: EmailPattern = row.pattern.parse()?;
        let source = row
            .source
            .as_deref()
            .map(str::parse::<PatternSource>)
            .transpose()?;
        Ok(EmailPatternRecord {
            id: row.id,
            company_id: row.company_id,
            pattern,
            reason: row.reason,
            domain: row.domain,
            source,
            sample_email: row.sample_email,
            verified_at: row.verified_at,
            success_count: row.success_count,
            total_count: row.total_count,
        }
        .validated()?)
    }
}

const SELECT_COLUMNS: &str = "id, company_id, pattern, reason, domain, source, sample_email, \
                              verified_at, success_count, total_count";

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Returns the most recently verified ledger entry for `domain` that has at
/// least one deliverable address, or `None` when every such entry is older
/// than `max_age_days` or stamped in the future.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::Validation`] if
/// the stored row is malformed.
pub async fn find_recent_learned_pattern(
    pool: &PgPool,
    domain: &str,
    max_age_days: u32,
) -> Result<Option<EmailPatternRecord>, DbError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM email_patterns \
         WHERE domain = $1 \
           AND success_count > 0 \
           AND verified_at IS NOT NULL \
           AND verified_at >= NOW() - make_interval(days => $2) \
           AND verified_at <= NOW() \
         ORDER BY verified_at DESC \
         LIMIT 1"
    );
    let row = sqlx::query_as::<_, EmailPatternRow>(&sql)
        .bind(domain)
        .bind(days_param(max_age_days))
        .fetch_optional(pool)
        .await?;

    row.map(EmailPatternRecord::try_from).transpose()
}

/// Add a score run's counts into the ledger entry for `(domain, pattern)`.
///
/// The counts are summed inside one statement so concurrent writers never
/// lose increments. The existing row keeps its `id`; a null incoming
/// `sample_email` or `verified_at` keeps the stored value. `company_id`
/// points at the stored company for the domain when one exists, falling back
/// to the record's own id. A record without a domain is inserted as-is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_learned_pattern(
    pool: &PgPool,
    record: &EmailPatternRecord,
) -> Result<(), DbError> {
    if record.domain.is_none() {
        let mut tx = pool.begin().await?;
        insert_pattern_decision(&mut tx, record, record.company_id).await?;
        tx.commit().await?;
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO email_patterns \
           (id, company_id, pattern, reason, domain, source, sample_email, \
            verified_at, success_count, total_count) \
         VALUES ($1, COALESCE((SELECT id FROM companies WHERE domain = $5), $2), \
                 $3, $4, $5, $6, $7, $8, COALESCE($9, 0), COALESCE($10, 0)) \
         ON CONFLICT (domain, pattern) WHERE domain IS NOT NULL DO UPDATE SET \
           company_id = EXCLUDED.company_id, \
           reason = EXCLUDED.reason, \
           source = COALESCE(EXCLUDED.source, email_patterns.source), \
           sample_email = COALESCE(EXCLUDED.sample_email, email_patterns.sample_email), \
           verified_at = COALESCE(EXCLUDED.verified_at, email_patterns.verified_at), \
           success_count = COALESCE(email_patterns.success_count, 0) + EXCLUDED.success_count, \
           total_count = COALESCE(email_patterns.total_count, 0) + EXCLUDED.total_count",
    )
    .bind(record.id)
    .bind(record.company_id)
    .bind(record.pattern.as_str())
    .bind(&record.reason)
    .bind(record.domain.as_deref())
    .bind(record.source.map(PatternSource::as_str))
    .bind(record.sample_email.as_deref())
    .bind(record.verified_at)
    .bind(record.success_count)
    .bind(record.total_count)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a decision record under `company_id`. Re-exporting the same
/// snapshot is a no-op.
pub(crate) async fn insert_pattern_decision(
    tx: &mut Transaction<'_, Postgres>,
    record: &EmailPatternRecord,
    company_id: Uuid,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO email_patterns \
           (id, company_id, pattern, reason, domain, source, sample_email, \
            verified_at, success_count, total_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(record.id)
    .bind(company_id)
    .bind(record.pattern.as_str())
    .bind(&record.reason)
    .bind(record.domain.as_deref())
    .bind(record.source.map(PatternSource::as_str))
    .bind(record.sample_email.as_deref())
    .bind(record.verified_at)
    .bind(record.success_count)
    .bind(record.total_count)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// All ledger entries for `domain`, most recently verified first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::Validation`] if
/// a stored row is malformed.
pub async fn list_domain_patterns(
    pool: &PgPool,
    domain: &str,
) -> Result<Vec<EmailPatternRecord>, DbError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM email_patterns \
         WHERE domain = $1 \
         ORDER BY verified_at DESC NULLS LAST, pattern"
    );
    let rows = sqlx::query_as::<_, EmailPatternRow>(&sql)
        .bind(domain)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(EmailPatternRecord::try_from).collect()
}
