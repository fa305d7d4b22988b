//! Final records produced by a scan.
//!
//! Every record is built through a constructor or `validated()` call that
//! returns `Result<_, ValidationError>`; invalid records are never coerced.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::department::{classify_department, DepartmentCategory};
use crate::pattern::EmailPattern;
use crate::scan::FoundContact;
use crate::ValidationError;

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub(crate) fn validate_domain(domain: &str) -> Result<(), ValidationError> {
    let looks_valid = !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && !domain.chars().any(char::is_whitespace);
    if looks_valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidDomain(domain.to_string()))
    }
}

/// Accepts degenerate local parts (built from empty name segments) but
/// requires exactly one `@` followed by a plausible domain.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut parts = email.split('@');
    let (Some(_local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    };
    validate_domain(domain).map_err(|_| ValidationError::InvalidEmail(email.to_string()))
}

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
}

impl CompanyRecord {
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the name is blank or the domain is malformed.
    pub fn new(id: Uuid, name: &str, domain: &str) -> Result<Self, ValidationError> {
        require_non_empty("company name", name)?;
        validate_domain(domain)?;
        Ok(Self {
            id,
            name: name.trim().to_string(),
            domain: domain.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub position: String,
    pub department: String,
    pub department_category: DepartmentCategory,
    pub first_name: String,
    pub last_name: String,
}

impl ContactRecord {
    /// Build a contact from a discovery result. The department category is
    /// derived from the free-form department.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if the contact has no name.
    pub fn new(id: Uuid, company_id: Uuid, found: &FoundContact) -> Result<Self, ValidationError> {
        require_non_empty("contact name", &found.name)?;
        Ok(Self {
            id,
            company_id,
            name: found.name.trim().to_string(),
            position: found.position.trim().to_string(),
            department: found.department.trim().to_string(),
            department_category: classify_department(&found.department),
            first_name: found.first_name.trim().to_string(),
            last_name: found.last_name.trim().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Email candidate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    Personal,
    Role,
}

impl EmailType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EmailType::Personal => "personal",
            EmailType::Role => "role",
        }
    }
}

impl FromStr for EmailType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(EmailType::Personal),
            "role" => Ok(EmailType::Role),
            other => Err(ValidationError::UnknownVariant {
                kind: "email type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCandidateRecord {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub email: String,
    pub is_primary: bool,
    pub confidence: f64,
    pub email_type: EmailType,
    pub pattern: Option<EmailPattern>,
    pub is_deliverable: Option<bool>,
    pub has_mx_records: Option<bool>,
    pub verification_reason: Option<String>,
}

impl EmailCandidateRecord {
    /// Check the address and clamp `confidence` into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed address or a non-finite
    /// confidence.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        validate_email(&self.email)?;
        if !self.confidence.is_finite() {
            return Err(ValidationError::InvalidConfidence(self.confidence));
        }
        self.confidence = self.confidence.clamp(0.0, 1.0);
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Email pattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Detected by the web-search collaborator.
    Llm,
    /// Learned from mailbox verification outcomes.
    EmailHippo,
}

impl PatternSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PatternSource::Llm => "llm",
            PatternSource::EmailHippo => "email_hippo",
        }
    }
}

impl FromStr for PatternSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llm" => Ok(PatternSource::Llm),
            "email_hippo" => Ok(PatternSource::EmailHippo),
            other => Err(ValidationError::UnknownVariant {
                kind: "pattern source",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailPatternRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub pattern: EmailPattern,
    pub reason: String,
    pub domain: Option<String>,
    pub source: Option<PatternSource>,
    pub sample_email: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub success_count: Option<i64>,
    pub total_count: Option<i64>,
}

impl EmailPatternRecord {
    /// A decision record for a company: no domain ledger fields.
    #[must_use]
    pub fn decided(
        id: Uuid,
        company_id: Uuid,
        pattern: EmailPattern,
        reason: &str,
        source: PatternSource,
    ) -> Self {
        Self {
            id,
            company_id,
            pattern,
            reason: reason.to_string(),
            domain: None,
            source: Some(source),
            sample_email: None,
            verified_at: None,
            success_count: None,
            total_count: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] when counts are negative, success exceeds
    /// total, the domain is malformed, or the sample email is malformed.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if let Some(domain) = &self.domain {
            validate_domain(domain)?;
        }
        if let Some(sample) = &self.sample_email {
            validate_email(sample)?;
        }
        if self.success_count.is_some_and(|c| c < 0) {
            return Err(ValidationError::NegativeCount {
                field: "success_count",
            });
        }
        if self.total_count.is_some_and(|c| c < 0) {
            return Err(ValidationError::NegativeCount {
                field: "total_count",
            });
        }
        if let (Some(success), Some(total)) = (self.success_count, self.total_count) {
            if success > total {
                return Err(ValidationError::CountMismatch { success, total });
            }
        }
        Ok(self)
    }
}
