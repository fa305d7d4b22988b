//! Writing a scored [`LeadBatch`] to the lead tables.

use std::collections::HashMap;

use leadscan_core::{CompanyRecord, ContactRecord, EmailCandidateRecord, LeadBatch};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::email_patterns::insert_pattern_decision;
use crate::DbError;

/// Export one batch in a single transaction.
///
/// Companies are upserted by domain and keep their first id. Contacts and
/// candidates previously exported for the same company and department are
/// replaced, so exporting a re-scored snapshot does not duplicate rows.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if a contact or pattern references a company
/// missing from the batch, or [`DbError::Sqlx`] if any statement fails. The
/// transaction is rolled back on error.
pub async fn export_leads(pool: &PgPool, batch: &LeadBatch) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let mut company_ids: HashMap<Uuid, Uuid> = HashMap::new();
    for company in &batch.companies {
        let stored_id = upsert_company(&mut tx, company).await?;
        company_ids.insert(company.id, stored_id);

        sqlx::query("DELETE FROM contacts WHERE company_id = $1 AND scan_department = $2")
            .bind(stored_id)
            .bind(&batch.department)
            .execute(&mut *tx)
            .await?;
    }

    for contact in &batch.contacts {
        let company_id = *company_ids.get(&contact.company_id).ok_or(DbError::NotFound)?;
        insert_contact(&mut tx, contact, company_id, &batch.department).await?;
    }

    for candidate in &batch.email_candidates {
        insert_candidate(&mut tx, candidate).await?;
    }

    for record in &batch.email_patterns {
        let company_id = *company_ids.get(&record.company_id).ok_or(DbError::NotFound)?;
        insert_pattern_decision(&mut tx, record, company_id).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn upsert_company(
    tx: &mut Transaction<'_, Postgres>,
    company: &CompanyRecord,
) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO companies (id, name, domain) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (domain) DO UPDATE SET \
           name = EXCLUDED.name, \
           updated_at = NOW() \
         RETURNING id",
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.domain)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

async fn insert_contact(
    tx: &mut Transaction<'_, Postgres>,
    contact: &ContactRecord,
    company_id: Uuid,
    scan_department: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO contacts \
           (id, company_id, scan_department, name, position, department, \
            department_category, first_name, last_name) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(contact.id)
    .bind(company_id)
    .bind(scan_department)
    .bind(&contact.name)
    .bind(&contact.position)
    .bind(&contact.department)
    .bind(contact.department_category.as_str())
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_candidate(
    tx: &mut Transaction<'_, Postgres>,
    candidate: &EmailCandidateRecord,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO email_candidates \
           (id, contact_id, email, is_primary, confidence, email_type, pattern, \
            is_deliverable, has_mx_records, verification_reason) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(candidate.id)
    .bind(candidate.contact_id)
    .bind(&candidate.email)
    .bind(candidate.is_primary)
    .bind(candidate.confidence)
    .bind(candidate.email_type.as_str())
    .bind(candidate.pattern.map(|p| p.as_str()))
    .bind(candidate.is_deliverable)
    .bind(candidate.has_mx_records)
    .bind(candidate.verification_reason.as_deref())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
