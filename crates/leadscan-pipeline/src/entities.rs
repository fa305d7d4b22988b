//! Turning a scored snapshot into validated records for export.

use std::collections::HashMap;

use leadscan_core::{
    CompanyRecord, CompanyScanRawData, ContactRecord, EmailCandidateRecord, EmailVerificationResult,
    IdGenerator, LeadBatch, ValidationError,
};

use crate::candidates::{ContactCandidates, EmailAddress};
use crate::scoring::adjust_email_confidence;

/// Build the company, contact, candidate and pattern records for one scan.
///
/// Candidate confidence is the generated prior adjusted by whatever
/// verification evidence exists for that exact address.
///
/// # Errors
///
/// Returns the first [`ValidationError`] raised by a record constructor.
pub fn build_lead_batch(
    raw: &CompanyScanRawData,
    contacts: &[ContactCandidates],
    verifications: &HashMap<String, EmailVerificationResult>,
    ids: &dyn IdGenerator,
) -> Result<LeadBatch, ValidationError> {
    let company = CompanyRecord::new(raw.company_id, &raw.company.name, &raw.company.domain)?;

    let mut batch = LeadBatch {
        department: raw.department.clone(),
        companies: vec![company],
        ..LeadBatch::default()
    };

    for entry in contacts {
        let contact = ContactRecord::new(ids.generate(), raw.company_id, &entry.contact)?;

        for (address, is_primary) in std::iter::once((&entry.candidates.primary, true))
            .chain(entry.candidates.alternatives.iter().map(|a| (a, false)))
        {
            let record = candidate_record(ids, &contact, address, is_primary, verifications)?;
            batch.email_candidates.push(record);
        }

        batch.contacts.push(contact);
    }

    for record in &raw.pattern_decision.records {
        batch.email_patterns.push(record.clone().validated()?);
    }

    Ok(batch)
}

fn candidate_record(
    ids: &dyn IdGenerator,
    contact: &ContactRecord,
    address: &EmailAddress,
    is_primary: bool,
    verifications: &HashMap<String, EmailVerificationResult>,
) -> Result<EmailCandidateRecord, ValidationError> {
    let verification = verifications.get(&address.value);
    EmailCandidateRecord {
        id: ids.generate(),
        contact_id: contact.id,
        email: address.value.clone(),
        is_primary,
        confidence: adjust_email_confidence(address.confidence, verification),
        email_type: address.email_type,
        pattern: Some(address.pattern),
        is_deliverable: verification.map(|v| v.is_deliverable),
        has_mx_records: verification.map(|v| v.has_mx_records),
        verification_reason: verification.and_then(|v| v.reason.clone()),
    }
    .validated()
}
