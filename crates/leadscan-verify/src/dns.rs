//! MX-record presence check. Cheaper and weaker than a mailbox check: it
//! says the domain accepts mail, not that the address exists.

use std::time::Duration;

use async_trait::async_trait;
use leadscan_core::{
    BoxError, DnsMxDetails, EmailVerificationResult, EmailVerifier, VerificationDetails,
};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::TokioAsyncResolver;

const DEFAULT_CACHE_MAX_AGE_DAYS: u32 = 90;

/// Outcome of one MX query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MxLookup {
    Found(Vec<String>),
    NoRecords,
    Failed(String),
}

pub struct DnsMxVerifier {
    resolver: TokioAsyncResolver,
    cache_max_age_days: u32,
}

impl DnsMxVerifier {
    #[must_use]
    pub fn new(timeout_secs: u64) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(timeout_secs);
        opts.attempts = 2;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            cache_max_age_days: DEFAULT_CACHE_MAX_AGE_DAYS,
        }
    }

    #[must_use]
    pub fn with_cache_max_age_days(mut self, days: u32) -> Self {
        self.cache_max_age_days = days;
        self
    }

    /// Look up MX records for the domain of `email`. Never fails: resolver
    /// errors come back as a verdict flagged `lookup_failed`.
    pub async fn check(&self, email: &str) -> EmailVerificationResult {
        let Some(domain) = email_domain(email) else {
            return invalid_format(email);
        };

        // Fully qualified, so the system search list is not appended.
        let lookup = match self.resolver.mx_lookup(format!("{domain}.")).await {
            Ok(records) => {
                let hosts: Vec<String> = records
                    .iter()
                    .map(|mx| mx.exchange().to_utf8().trim_end_matches('.').to_string())
                    .collect();
                if hosts.is_empty() {
                    MxLookup::NoRecords
                } else {
                    MxLookup::Found(hosts)
                }
            }
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                MxLookup::NoRecords
            }
            Err(e) => {
                tracing::warn!(domain, error = %e, "MX lookup failed");
                MxLookup::Failed(e.to_string())
            }
        };

        mx_verdict(email, lookup)
    }
}

#[async_trait]
impl EmailVerifier for DnsMxVerifier {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError> {
        Ok(self.check(email).await)
    }

    fn cache_max_age_days(&self) -> u32 {
        self.cache_max_age_days
    }
}

/// The part after the last `@`, if non-empty.
pub(crate) fn email_domain(email: &str) -> Option<&str> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim())
        .filter(|domain| !domain.is_empty())
}

pub(crate) fn mx_verdict(email: &str, lookup: MxLookup) -> EmailVerificationResult {
    let (has_mx, reason, details) = match lookup {
        MxLookup::Found(mx_hosts) => (
            true,
            "MX records found for domain".to_string(),
            DnsMxDetails {
                mx_hosts,
                lookup_failed: false,
            },
        ),
        MxLookup::NoRecords => (
            false,
            "No MX records found for domain".to_string(),
            DnsMxDetails::default(),
        ),
        MxLookup::Failed(message) => (
            false,
            format!("MX lookup failed: {message}"),
            DnsMxDetails {
                mx_hosts: Vec::new(),
                lookup_failed: true,
            },
        ),
    };

    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable: has_mx,
        has_mx_records: has_mx,
        reason: Some(reason),
        details: VerificationDetails::DnsMx(details),
    }
}

fn invalid_format(email: &str) -> EmailVerificationResult {
    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable: false,
        has_mx_records: false,
        reason: Some("Invalid email format".to_string()),
        details: VerificationDetails::DnsMx(DnsMxDetails::default()),
    }
}

#[cfg(test)]
mod tests {
    use leadscan_core::VerificationSource;

    use super::*;

    #[test]
    fn domain_is_taken_after_the_last_at() {
        assert_eq!(email_domain("taro@example.com"), Some("example.com"));
        assert_eq!(email_domain("\"a@b\"@example.co.jp"), Some("example.co.jp"));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("taro@"), None);
    }

    #[test]
    fn found_records_are_deliverable() {
        let result = mx_verdict(
            "taro@example.com",
            MxLookup::Found(vec!["mx1.example.com".to_string()]),
        );
        assert!(result.is_deliverable);
        assert!(result.has_mx_records);
        assert_eq!(result.source(), VerificationSource::DnsMx);
        assert!(!result.is_transient_failure());
    }

    #[test]
    fn no_records_is_a_cacheable_negative() {
        let result = mx_verdict("taro@example.com", MxLookup::NoRecords);
        assert!(!result.is_deliverable);
        assert!(!result.has_mx_records);
        assert_eq!(result.reason.as_deref(), Some("No MX records found for domain"));
        assert!(!result.is_transient_failure());
    }

    #[test]
    fn resolver_failure_is_transient() {
        let result = mx_verdict("taro@example.com", MxLookup::Failed("timed out".to_string()));
        assert!(!result.has_mx_records);
        assert_eq!(result.reason.as_deref(), Some("MX lookup failed: timed out"));
        assert!(result.is_transient_failure());
    }

    #[tokio::test]
    async fn address_without_domain_skips_the_resolver() {
        let verifier = DnsMxVerifier::new(1);
        let result = verifier.check("not-an-address").await;
        assert_eq!(result.reason.as_deref(), Some("Invalid email format"));
        assert!(!result.is_deliverable);
    }
}
