//! File-based [`LeadExporter`] for `--export csv`.
//!
//! Each export rewrites `companies.csv`, `contacts.csv`,
//! `email_candidates.csv` and `email_patterns.csv` under
//! `<dir>/<domain>/`, so scoring the same company again replaces its files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use leadscan_core::{
    BoxError, CompanyRecord, ContactRecord, EmailCandidateRecord, EmailPatternRecord, LeadBatch,
    LeadExporter,
};

pub struct CsvLeadExporter {
    root: PathBuf,
}

impl CsvLeadExporter {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn domain_dir(&self, domain: &str) -> Result<PathBuf, String> {
        if domain.is_empty()
            || domain.starts_with('.')
            || domain.contains(['/', '\\'])
        {
            return Err(format!("refusing to export to unsafe domain directory '{domain}'"));
        }
        Ok(self.root.join(domain))
    }
}

#[async_trait]
impl LeadExporter for CsvLeadExporter {
    async fn export(&self, domain: &str, batch: &LeadBatch) -> Result<(), BoxError> {
        let dir = self.domain_dir(domain)?;
        tokio::fs::create_dir_all(&dir).await?;

        let files = [
            ("companies.csv", companies_csv(&batch.companies)),
            ("contacts.csv", contacts_csv(&batch.contacts)),
            ("email_candidates.csv", candidates_csv(&batch.email_candidates)),
            ("email_patterns.csv", patterns_csv(&batch.email_patterns)),
        ];
        for (name, content) in files {
            tokio::fs::write(dir.join(name), content).await?;
        }

        tracing::info!(
            domain,
            dir = %dir.display(),
            contacts = batch.contacts.len(),
            candidates = batch.email_candidates.len(),
            "wrote CSV export"
        );
        Ok(())
    }
}

pub(crate) fn companies_csv(companies: &[CompanyRecord]) -> String {
    let mut out = String::from("ID,Name,Domain\n");
    for c in companies {
        push_row(&mut out, &[c.id.to_string(), c.name.clone(), c.domain.clone()]);
    }
    out
}

pub(crate) fn contacts_csv(contacts: &[ContactRecord]) -> String {
    let mut out = String::from(
        "ID,Company ID,Name,Position,Department,Department Category,First Name,Last Name\n",
    );
    for c in contacts {
        push_row(
            &mut out,
            &[
                c.id.to_string(),
                c.company_id.to_string(),
                c.name.clone(),
                c.position.clone(),
                c.department.clone(),
                c.department_category.as_str().to_string(),
                c.first_name.clone(),
                c.last_name.clone(),
            ],
        );
    }
    out
}

pub(crate) fn candidates_csv(candidates: &[EmailCandidateRecord]) -> String {
    let mut out = String::from(
        "ID,Contact ID,Email,Is Primary,Confidence,Type,Pattern,Is Deliverable,Has MX Records,Verification Reason\n",
    );
    for c in candidates {
        push_row(
            &mut out,
            &[
                c.id.to_string(),
                c.contact_id.to_string(),
                c.email.clone(),
                c.is_primary.to_string(),
                c.confidence.to_string(),
                c.email_type.as_str().to_string(),
                c.pattern.map(|p| p.as_str().to_string()).unwrap_or_default(),
                optional_bool(c.is_deliverable),
                optional_bool(c.has_mx_records),
                c.verification_reason.clone().unwrap_or_default(),
            ],
        );
    }
    out
}

pub(crate) fn patterns_csv(patterns: &[EmailPatternRecord]) -> String {
    let mut out = String::from(
        "ID,Company ID,Pattern,Reason,Domain,Source,Sample Email,Verified At,Success Count,Total Count\n",
    );
    for p in patterns {
        push_row(
            &mut out,
            &[
                p.id.to_string(),
                p.company_id.to_string(),
                p.pattern.as_str().to_string(),
                p.reason.clone(),
                p.domain.clone().unwrap_or_default(),
                p.source.map(|s| s.as_str().to_string()).unwrap_or_default(),
                p.sample_email.clone().unwrap_or_default(),
                p.verified_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                p.success_count.map(|n| n.to_string()).unwrap_or_default(),
                p.total_count.map(|n| n.to_string()).unwrap_or_default(),
            ],
        );
    }
    out
}

fn optional_bool(value: Option<bool>) -> String {
    value.map(|b| b.to_string()).unwrap_or_default()
}

fn push_row(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "{line}");
}

/// Quote a field when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
