//! Collaborator interfaces consumed by the scan pipeline.
//!
//! Implementations live in the persistence, LLM and verifier crates; the
//! pipeline only sees these traits. Failures are boxed so each phase can wrap
//! them in its own typed error.

use async_trait::async_trait;
use uuid::Uuid;

use crate::pattern::DetectedPattern;
use crate::records::{CompanyRecord, ContactRecord, EmailCandidateRecord, EmailPatternRecord};
use crate::scan::{CompanyScanRawData, FoundContact};
use crate::verification::EmailVerificationResult;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[async_trait]
pub trait ContactFinder: Send + Sync {
    async fn search_contacts(
        &self,
        company_name: &str,
        domain: &str,
        department: &str,
    ) -> Result<Vec<FoundContact>, BoxError>;
}

#[async_trait]
pub trait EmailPatternDetector: Send + Sync {
    /// `Ok(None)` means the detector had nothing to offer.
    async fn detect(&self, domain: &str) -> Result<Option<DetectedPattern>, BoxError>;
}

#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError>;

    /// How long this verifier's verdicts stay usable in the cache.
    fn cache_max_age_days(&self) -> u32;
}

#[async_trait]
pub trait EmailVerificationRepository: Send + Sync {
    async fn find_recent(
        &self,
        email: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailVerificationResult>, BoxError>;

    async fn save(&self, result: &EmailVerificationResult) -> Result<(), BoxError>;
}

#[async_trait]
pub trait EmailPatternRepository: Send + Sync {
    async fn find_recent_by_domain(
        &self,
        domain: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailPatternRecord>, BoxError>;

    /// Additive merge: counts are added to any stored record for the same
    /// `(domain, pattern)`.
    async fn save(&self, record: &EmailPatternRecord) -> Result<(), BoxError>;
}

#[async_trait]
pub trait CompanyScanRawStore: Send + Sync {
    /// Upsert keyed by `(domain, department)`; last write wins.
    async fn save(&self, raw: &CompanyScanRawData) -> Result<(), BoxError>;

    async fn load(
        &self,
        domain: &str,
        department: &str,
    ) -> Result<Option<CompanyScanRawData>, BoxError>;
}

#[async_trait]
pub trait ContactSearchCache: Send + Sync {
    async fn find_recent(
        &self,
        domain: &str,
        department: &str,
        max_age_days: u32,
    ) -> Result<Option<Vec<FoundContact>>, BoxError>;

    async fn save(
        &self,
        domain: &str,
        department: &str,
        contacts: &[FoundContact],
    ) -> Result<(), BoxError>;
}

/// Final records for one completed score phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadBatch {
    /// Department the scan targeted. Exports replace earlier contacts for
    /// the same company and department.
    pub department: String,
    pub companies: Vec<CompanyRecord>,
    pub contacts: Vec<ContactRecord>,
    pub email_candidates: Vec<EmailCandidateRecord>,
    pub email_patterns: Vec<EmailPatternRecord>,
}

#[async_trait]
pub trait LeadExporter: Send + Sync {
    async fn export(&self, domain: &str, batch: &LeadBatch) -> Result<(), BoxError>;
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
