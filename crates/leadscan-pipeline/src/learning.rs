//! Folding verification outcomes back into the per-domain pattern ledger.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use leadscan_core::{
    EmailCandidateRecord, EmailPattern, EmailPatternRecord, EmailVerificationResult,
    LearnedPattern, PatternSource, ValidationError, VerificationSource,
};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternOutcome {
    pub total: i64,
    pub deliverable: i64,
    pub sample_email: Option<String>,
}

/// Count candidates built with `pattern` that got a mailbox-level verdict,
/// and how many of those were deliverable.
///
/// MX-only verdicts and provider failures say nothing about the local-part
/// convention, so they are left out of both counts.
#[must_use]
pub fn summarize_pattern_outcome(
    candidates: &[EmailCandidateRecord],
    results: &HashMap<String, EmailVerificationResult>,
    pattern: EmailPattern,
) -> PatternOutcome {
    candidates
        .iter()
        .filter(|c| c.pattern == Some(pattern))
        .filter(|c| results.get(&c.email).is_some_and(is_mailbox_verdict))
        .fold(PatternOutcome::default(), |mut acc, c| {
            acc.total += 1;
            if c.is_deliverable == Some(true) {
                acc.deliverable += 1;
                if acc.sample_email.is_none() {
                    acc.sample_email = Some(c.email.clone());
                }
            }
            acc
        })
}

fn is_mailbox_verdict(result: &EmailVerificationResult) -> bool {
    result.source() == VerificationSource::EmailHippo && !result.is_transient_failure()
}

/// Build the ledger increment for one score run. `None` when no candidate
/// built with the pattern got a mailbox-level verdict.
///
/// # Errors
///
/// Returns [`ValidationError`] if the resulting record is malformed.
pub fn build_learning_record(
    id: Uuid,
    company_id: Uuid,
    domain: &str,
    pattern: EmailPattern,
    outcome: &PatternOutcome,
    now: DateTime<Utc>,
) -> Result<Option<EmailPatternRecord>, ValidationError> {
    if outcome.total == 0 {
        return Ok(None);
    }

    let record = EmailPatternRecord {
        id,
        company_id,
        pattern,
        reason: format!("learned from mailbox verification of {pattern} addresses"),
        domain: Some(domain.to_string()),
        source: Some(PatternSource::EmailHippo),
        sample_email: outcome.sample_email.clone(),
        verified_at: Some(now),
        success_count: Some(outcome.deliverable),
        total_count: Some(outcome.total),
    };

    record.validated().map(Some)
}

/// A stored ledger entry counts as a learned pattern only once at least one
/// address built with it was deliverable. The reason is rebuilt from the
/// accumulated counts.
#[must_use]
pub fn learned_pattern_from_record(record: &EmailPatternRecord) -> Option<LearnedPattern> {
    let successes = record.success_count.unwrap_or(0);
    if successes <= 0 {
        return None;
    }
    let total = record.total_count.unwrap_or(successes);
    Some(LearnedPattern {
        pattern: record.pattern,
        reason: format!(
            "{successes} of {total} verified {} addresses were deliverable",
            record.pattern
        ),
    })
}

#[cfg(test)]
mod tests {
    use leadscan_core::{DnsMxDetails, EmailType, HippoDetails, VerificationDetails};

    use super::*;

    fn candidate(email: &str, pattern: EmailPattern, deliverable: Option<bool>) -> EmailCandidateRecord {
        EmailCandidateRecord {
            id: Uuid::new_v4(),
            contact_id: Uuid::new_v4(),
            email: email.to_string(),
            is_primary: false,
            confidence: 0.3,
            email_type: EmailType::Personal,
            pattern: Some(pattern),
            is_deliverable: deliverable,
            has_mx_records: None,
            verification_reason: None,
        }
    }

    fn hippo(email: &str, deliverable: bool, provider_error: bool) -> EmailVerificationResult {
        EmailVerificationResult {
            email: email.to_string(),
            is_deliverable: deliverable,
            has_mx_records: true,
            reason: None,
            details: VerificationDetails::EmailHippo(HippoDetails {
                provider_error,
                ..HippoDetails::default()
            }),
        }
    }

    fn mx_only(email: &str) -> EmailVerificationResult {
        EmailVerificationResult {
            email: email.to_string(),
            is_deliverable: true,
            has_mx_records: true,
            reason: Some("MX records found for domain".to_string()),
            details: VerificationDetails::DnsMx(DnsMxDetails {
                mx_hosts: vec!["mx.example.com".to_string()],
                lookup_failed: false,
            }),
        }
    }

    fn results(entries: Vec<EmailVerificationResult>) -> HashMap<String, EmailVerificationResult> {
        entries.into_iter().map(|r| (r.email.clone(), r)).collect()
    }

    #[test]
    fn outcome_counts_only_the_decided_pattern() {
        let candidates = vec![
            candidate("t-yamada@example.com", EmailPattern::InitialDashLast, Some(true)),
            candidate("h-sato@example.com", EmailPattern::InitialDashLast, Some(false)),
            candidate("taro.yamada@example.com", EmailPattern::FirstDotLast, Some(true)),
            candidate("k-ito@example.com", EmailPattern::InitialDashLast, None),
        ];
        let verdicts = results(vec![
            hippo("t-yamada@example.com", true, false),
            hippo("h-sato@example.com", false, false),
            hippo("taro.yamada@example.com", true, false),
        ]);
        let outcome =
            summarize_pattern_outcome(&candidates, &verdicts, EmailPattern::InitialDashLast);
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.deliverable, 1);
        assert_eq!(outcome.sample_email.as_deref(), Some("t-yamada@example.com"));
    }

    #[test]
    fn mx_only_and_provider_failure_verdicts_are_not_evidence() {
        let candidates = vec![
            candidate("t-yamada@example.com", EmailPattern::InitialDashLast, Some(true)),
            candidate("h-sato@example.com", EmailPattern::InitialDashLast, Some(false)),
        ];
        let verdicts = results(vec![
            mx_only("t-yamada@example.com"),
            hippo("h-sato@example.com", false, true),
        ]);
        let outcome =
            summarize_pattern_outcome(&candidates, &verdicts, EmailPattern::InitialDashLast);
        assert_eq!(outcome, PatternOutcome::default());

        let record = build_learning_record(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "example.com",
            EmailPattern::InitialDashLast,
            &outcome,
            Utc::now(),
        )
        .unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn no_matching_candidates_produce_no_record() {
        let outcome = PatternOutcome::default();
        let record = build_learning_record(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "example.com",
            EmailPattern::FirstDotLast,
            &outcome,
            Utc::now(),
        )
        .unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn learning_record_carries_counts_and_source() {
        let outcome = PatternOutcome {
            total: 5,
            deliverable: 2,
            sample_email: Some("t-yamada@example.com".to_string()),
        };
        let now = Utc::now();
        let record = build_learning_record(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "example.com",
            EmailPattern::InitialDashLast,
            &outcome,
            now,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.source, Some(PatternSource::EmailHippo));
        assert_eq!(record.domain.as_deref(), Some("example.com"));
        assert_eq!(record.success_count, Some(2));
        assert_eq!(record.total_count, Some(5));
        assert_eq!(record.verified_at, Some(now));
        assert!(!record.reason.contains("of 5"));
    }

    #[test]
    fn zero_success_ledger_entry_is_not_a_learned_pattern() {
        let mut record = EmailPatternRecord::decided(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EmailPattern::FirstDotLast,
            "learned from mailbox verification of first.last addresses",
            PatternSource::EmailHippo,
        );
        record.success_count = Some(0);
        record.total_count = Some(4);
        assert!(learned_pattern_from_record(&record).is_none());

        record.success_count = Some(3);
        record.total_count = Some(8);
        let learned = learned_pattern_from_record(&record).unwrap();
        assert_eq!(learned.pattern, EmailPattern::FirstDotLast);
        assert_eq!(learned.reason, "3 of 8 verified first.last addresses were deliverable");
    }
}
