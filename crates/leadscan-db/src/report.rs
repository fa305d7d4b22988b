//! Read queries behind `leadscan show`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
}

/// One contact joined with one of its candidates. Contacts with no
/// candidate above the threshold appear once with `email = None`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateReportRow {
    pub contact_id: Uuid,
    pub contact_name: String,
    pub position: String,
    pub department: String,
    pub department_category: String,
    pub email: Option<String>,
    pub is_primary: Option<bool>,
    pub confidence: Option<f64>,
    pub is_deliverable: Option<bool>,
    pub verification_reason: Option<String>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company_by_domain(
    pool: &PgPool,
    domain: &str,
) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(
        "SELECT id, name, domain FROM companies WHERE domain = $1",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Contacts of `company_id` with their candidates at or above
/// `min_confidence`, primaries first and then by descending confidence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_candidates_for_company(
    pool: &PgPool,
    company_id: Uuid,
    min_confidence: f64,
) -> Result<Vec<CandidateReportRow>, DbError> {
    let rows = sqlx::query_as::<_, CandidateReportRow>(
        "SELECT c.id AS contact_id, c.name AS contact_name, c.position, c.department, \
                c.department_category, e.email, e.is_primary, e.confidence, \
                e.is_deliverable, e.verification_reason \
         FROM contacts c \
         LEFT JOIN email_candidates e \
           ON e.contact_id = c.id AND e.confidence >= $2 \
         WHERE c.company_id = $1 \
         ORDER BY c.name, c.id, e.is_primary DESC NULLS LAST, e.confidence DESC NULLS LAST",
    )
    .bind(company_id)
    .bind(min_confidence)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
