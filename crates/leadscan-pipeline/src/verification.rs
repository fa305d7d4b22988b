//! Resolving deliverability for candidate addresses through the cache and
//! the external verifier, primaries first.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use leadscan_core::{EmailVerificationRepository, EmailVerificationResult, EmailVerifier};

use crate::candidates::ContactCandidates;
use crate::error::{bounded, ScanError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    pub results: HashMap<String, EmailVerificationResult>,
    pub cache_hits: usize,
    pub fresh_verifications: usize,
    /// Alternatives were verified because no primary was deliverable.
    pub escalated: bool,
}

impl VerificationReport {
    fn absorb(&mut self, other: VerificationReport) {
        self.results.extend(other.results);
        self.cache_hits += other.cache_hits;
        self.fresh_verifications += other.fresh_verifications;
    }
}

enum Lookup {
    Cached(EmailVerificationResult),
    Fresh(EmailVerificationResult),
}

pub struct VerificationCoordinator<'a> {
    verifier: &'a dyn EmailVerifier,
    repository: &'a dyn EmailVerificationRepository,
    concurrency: usize,
    call_timeout: Duration,
}

impl<'a> VerificationCoordinator<'a> {
    #[must_use]
    pub fn new(
        verifier: &'a dyn EmailVerifier,
        repository: &'a dyn EmailVerificationRepository,
        concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            repository,
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Verify a contact batch with two-stage escalation: primaries first,
    /// alternatives only when no primary came back deliverable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError`] raised by the cache or verifier; no
    /// partial report is returned.
    pub async fn verify_candidates(
        &self,
        contacts: &[ContactCandidates],
    ) -> Result<VerificationReport, ScanError> {
        let primaries: Vec<String> = contacts
            .iter()
            .map(|c| c.candidates.primary.value.clone())
            .collect();
        let mut report = self.verify_emails(&primaries).await?;

        let any_primary_deliverable = primaries
            .iter()
            .any(|email| report.results.get(email).is_some_and(|r| r.is_deliverable));
        if any_primary_deliverable || contacts.is_empty() {
            return Ok(report);
        }

        let alternatives: Vec<String> = contacts
            .iter()
            .flat_map(|c| c.candidates.alternatives.iter())
            .map(|a| a.value.clone())
            .filter(|email| !report.results.contains_key(email))
            .collect();

        tracing::info!(
            primaries = primaries.len(),
            alternatives = alternatives.len(),
            "no primary candidate deliverable; verifying alternatives"
        );

        let second = self.verify_emails(&alternatives).await?;
        report.absorb(second);
        report.escalated = true;
        Ok(report)
    }

    /// Verify `emails` concurrently, consulting the cache first. Duplicate
    /// addresses are looked up once.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError`] raised by the cache or verifier.
    pub async fn verify_emails(&self, emails: &[String]) -> Result<VerificationReport, ScanError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = emails
            .iter()
            .map(String::as_str)
            .filter(|e| seen.insert(*e))
            .collect();

        let pending: Vec<_> = unique.into_iter().map(|email| self.lookup(email)).collect();
        let lookups: Vec<Lookup> = stream::iter(pending)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let mut report = VerificationReport::default();
        for lookup in lookups {
            let result = match lookup {
                Lookup::Cached(result) => {
                    report.cache_hits += 1;
                    result
                }
                Lookup::Fresh(result) => {
                    report.fresh_verifications += 1;
                    result
                }
            };
            report.results.insert(result.email.clone(), result);
        }
        Ok(report)
    }

    async fn lookup(&self, email: &str) -> Result<Lookup, ScanError> {
        let max_age_days = self.verifier.cache_max_age_days();

        let cached = bounded(
            "verification cache read",
            self.call_timeout,
            self.repository.find_recent(email, max_age_days),
        )
        .await?
        .map_err(|source| ScanError::Persistence {
            operation: "verification cache read",
            source,
        })?;
        if let Some(mut result) = cached {
            tracing::debug!(email, "verification cache hit");
            result.email = email.to_string();
            return Ok(Lookup::Cached(result));
        }

        let mut result = bounded(
            "email verification",
            self.call_timeout,
            self.verifier.verify(email),
        )
        .await?
        .map_err(|source| ScanError::Verification {
            email: email.to_string(),
            source,
        })?;
        result.email = email.to_string();

        if result.is_transient_failure() {
            tracing::warn!(
                email,
                reason = result.reason.as_deref().unwrap_or_default(),
                "verifier returned a provider-side failure; not caching"
            );
        } else {
            bounded(
                "verification cache write",
                self.call_timeout,
                self.repository.save(&result),
            )
            .await?
            .map_err(|source| ScanError::Persistence {
                operation: "verification cache write",
                source,
            })?;
        }

        Ok(Lookup::Fresh(result))
    }
}
