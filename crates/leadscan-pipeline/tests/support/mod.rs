//! In-memory collaborators with call counters for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadscan_core::{
    is_within_days, BoxError, CompanyInput, CompanyScanRawData, CompanyScanRawStore,
    ContactFinder, DetectedPattern, EmailPatternDetector, EmailPatternRecord,
    EmailPatternRepository, EmailVerificationRepository, EmailVerificationResult, EmailVerifier,
    DnsMxDetails, FoundContact, HippoDetails, LeadBatch, LeadExporter, ScanTarget, UuidGenerator,
    VerificationDetails,
};
use leadscan_pipeline::{ScanDependencies, ScanOrchestrator, ScanSettings};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub String);

pub fn boxed(msg: &str) -> BoxError {
    Box::new(FakeError(msg.to_string()))
}

pub fn contact(first: &str, last: &str) -> FoundContact {
    FoundContact {
        name: format!("{first} {last}"),
        position: "Manager".to_string(),
        department: "営業部".to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        sources: Vec::new(),
    }
}

pub fn target(domain: &str, department: &str) -> ScanTarget {
    ScanTarget {
        company: CompanyInput {
            name: format!("{domain} KK"),
            domain: domain.to_string(),
        },
        department: department.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeVerifier {
    pub deliverable: HashSet<String>,
    pub provider_errors: HashSet<String>,
    pub hard_failures: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn with_deliverable<I: IntoIterator<Item = &'static str>>(emails: I) -> Self {
        Self {
            deliverable: emails.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn hippo_result(email: &str, is_deliverable: bool, provider_error: bool) -> EmailVerificationResult {
    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable,
        has_mx_records: true,
        reason: Some(format!("Mailbox={}", if is_deliverable { "Ok" } else { "Bad" })),
        details: VerificationDetails::EmailHippo(HippoDetails {
            provider_error,
            ..HippoDetails::default()
        }),
    }
}

#[async_trait]
impl EmailVerifier for FakeVerifier {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError> {
        self.calls.lock().unwrap().push(email.to_string());
        if self.hard_failures.contains(email) {
            return Err(boxed("verifier rejected credentials"));
        }
        let provider_error = self.provider_errors.contains(email);
        Ok(hippo_result(
            email,
            !provider_error && self.deliverable.contains(email),
            provider_error,
        ))
    }

    fn cache_max_age_days(&self) -> u32 {
        180
    }
}

/// Answers every address from MX presence alone, like the DNS verifier on a
/// domain with mail servers.
#[derive(Default)]
pub struct MxOnlyVerifier {
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmailVerifier for MxOnlyVerifier {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmailVerificationResult {
            email: email.to_string(),
            is_deliverable: true,
            has_mx_records: true,
            reason: Some("MX records found for domain".to_string()),
            details: VerificationDetails::DnsMx(DnsMxDetails {
                mx_hosts: vec!["mx.example.com".to_string()],
                lookup_failed: false,
            }),
        })
    }

    fn cache_max_age_days(&self) -> u32 {
        90
    }
}

// ---------------------------------------------------------------------------
// Verification cache with a controllable clock
// ---------------------------------------------------------------------------

pub struct MemoryVerificationRepository {
    entries: Mutex<HashMap<String, (EmailVerificationResult, DateTime<Utc>)>>,
    now: Mutex<DateTime<Utc>>,
    pub saves: AtomicUsize,
}

impl Default for MemoryVerificationRepository {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            now: Mutex::new(Utc::now()),
            saves: AtomicUsize::new(0),
        }
    }
}

impl MemoryVerificationRepository {
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn seed(&self, result: EmailVerificationResult) {
        let now = *self.now.lock().unwrap();
        self.entries
            .lock()
            .unwrap()
            .insert(result.email.clone(), (result, now));
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entries.lock().unwrap().contains_key(email)
    }
}

#[async_trait]
impl EmailVerificationRepository for MemoryVerificationRepository {
    async fn find_recent(
        &self,
        email: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailVerificationResult>, BoxError> {
        let now = *self.now.lock().unwrap();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(email)
            .filter(|(_, saved_at)| is_within_days(*saved_at, now, max_age_days))
            .map(|(result, _)| result.clone()))
    }

    async fn save(&self, result: &EmailVerificationResult) -> Result<(), BoxError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.seed(result.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pattern ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPatternRepository {
    pub records: Mutex<Vec<EmailPatternRecord>>,
}

#[async_trait]
impl EmailPatternRepository for MemoryPatternRepository {
    async fn find_recent_by_domain(
        &self,
        domain: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailPatternRecord>, BoxError> {
        let now = Utc::now();
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.domain.as_deref() == Some(domain))
            .filter(|r| r.success_count.unwrap_or(0) > 0)
            .filter(|r| r.verified_at.is_some_and(|v| is_within_days(v, now, max_age_days)))
            .max_by_key(|r| r.verified_at)
            .cloned())
    }

    async fn save(&self, record: &EmailPatternRecord) -> Result<(), BoxError> {
        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.domain.is_some() && r.domain == record.domain && r.pattern == record.pattern);
        match existing {
            Some(existing) => {
                existing.success_count = Some(
                    existing.success_count.unwrap_or(0) + record.success_count.unwrap_or(0),
                );
                existing.total_count =
                    Some(existing.total_count.unwrap_or(0) + record.total_count.unwrap_or(0));
                existing.reason.clone_from(&record.reason);
                if record.sample_email.is_some() {
                    existing.sample_email.clone_from(&record.sample_email);
                }
                existing.verified_at = record.verified_at.or(existing.verified_at);
            }
            None => records.push(record.clone()),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Raw store and exporter
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryRawStore {
    pub snapshots: Mutex<HashMap<(String, String), CompanyScanRawData>>,
    pub saves: AtomicUsize,
}

#[async_trait]
impl CompanyScanRawStore for MemoryRawStore {
    async fn save(&self, raw: &CompanyScanRawData) -> Result<(), BoxError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.snapshots.lock().unwrap().insert(
            (raw.company.domain.clone(), raw.department.clone()),
            raw.clone(),
        );
        Ok(())
    }

    async fn load(
        &self,
        domain: &str,
        department: &str,
    ) -> Result<Option<CompanyScanRawData>, BoxError> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .get(&(domain.to_string(), department.to_string()))
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordingExporter {
    pub exports: Mutex<Vec<(String, LeadBatch)>>,
    pub fail: bool,
}

impl RecordingExporter {
    pub fn count(&self) -> usize {
        self.exports.lock().unwrap().len()
    }
}

#[async_trait]
impl LeadExporter for RecordingExporter {
    async fn export(&self, domain: &str, batch: &LeadBatch) -> Result<(), BoxError> {
        if self.fail {
            return Err(boxed("export directory is read-only"));
        }
        self.exports
            .lock()
            .unwrap()
            .push((domain.to_string(), batch.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Discovery collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeFinder {
    pub contacts: Vec<FoundContact>,
    pub failing_domains: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeFinder {
    pub fn returning(contacts: Vec<FoundContact>) -> Self {
        Self {
            contacts,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ContactFinder for FakeFinder {
    async fn search_contacts(
        &self,
        _company_name: &str,
        domain: &str,
        _department: &str,
    ) -> Result<Vec<FoundContact>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_domains.contains(domain) {
            return Err(boxed("web search returned malformed JSON"));
        }
        Ok(self.contacts.clone())
    }
}

#[derive(Default)]
pub struct FakeDetector {
    pub detected: Option<DetectedPattern>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmailPatternDetector for FakeDetector {
    async fn detect(&self, _domain: &str) -> Result<Option<DetectedPattern>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detected.clone())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub finder: Arc<FakeFinder>,
    pub detector: Arc<FakeDetector>,
    pub verifier: Arc<FakeVerifier>,
    pub verifications: Arc<MemoryVerificationRepository>,
    pub patterns: Arc<MemoryPatternRepository>,
    pub raw_store: Arc<MemoryRawStore>,
    pub exporter: Arc<RecordingExporter>,
}

impl Harness {
    pub fn new(finder: FakeFinder, detector: FakeDetector, verifier: FakeVerifier) -> Self {
        Self {
            finder: Arc::new(finder),
            detector: Arc::new(detector),
            verifier: Arc::new(verifier),
            verifications: Arc::new(MemoryVerificationRepository::default()),
            patterns: Arc::new(MemoryPatternRepository::default()),
            raw_store: Arc::new(MemoryRawStore::default()),
            exporter: Arc::new(RecordingExporter::default()),
        }
    }

    pub fn orchestrator(&self) -> ScanOrchestrator {
        self.orchestrator_with_verifier(self.verifier.clone())
    }

    pub fn orchestrator_with_verifier(&self, verifier: Arc<dyn EmailVerifier>) -> ScanOrchestrator {
        let deps = ScanDependencies {
            contact_finder: self.finder.clone(),
            pattern_detector: self.detector.clone(),
            email_verifier: verifier,
            verification_repository: self.verifications.clone(),
            pattern_repository: self.patterns.clone(),
            raw_store: self.raw_store.clone(),
            lead_exporter: self.exporter.clone(),
            id_generator: Arc::new(UuidGenerator),
        };
        ScanOrchestrator::new(
            deps,
            ScanSettings {
                pattern_max_age_days: 365,
                verify_concurrency: 4,
                call_timeout: Duration::from_secs(5),
            },
        )
    }
}
