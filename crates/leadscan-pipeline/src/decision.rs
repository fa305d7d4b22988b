//! Choosing the email construction convention for a domain.

use leadscan_core::{
    DetectedPattern, EmailPatternRecord, IdGenerator, LearnedPattern, PatternDecision,
    PatternSource, DEFAULT_EMAIL_PATTERN,
};
use uuid::Uuid;

const NO_DETECTION_REASON: &str = "detector returned no pattern";

/// Decide the pattern for `company_id`.
///
/// Priority: a learned pattern, then a detected pattern with `found = true`,
/// then the default. The default never produces a record.
#[must_use]
pub fn decide_email_pattern(
    company_id: Uuid,
    detected: Option<&DetectedPattern>,
    learned: Option<&LearnedPattern>,
    ids: &dyn IdGenerator,
) -> PatternDecision {
    if let Some(learned) = learned {
        return PatternDecision {
            pattern: learned.pattern,
            records: vec![EmailPatternRecord::decided(
                ids.generate(),
                company_id,
                learned.pattern,
                &learned.reason,
                PatternSource::EmailHippo,
            )],
            log_messages: vec![
                format!(
                    "Using learned email pattern from past results: {}",
                    learned.pattern
                ),
                format!("Learned email pattern reason: {}", learned.reason),
            ],
        };
    }

    if let Some(detected) = detected.filter(|d| d.found) {
        return PatternDecision {
            pattern: detected.pattern,
            records: vec![EmailPatternRecord::decided(
                ids.generate(),
                company_id,
                detected.pattern,
                &detected.reason,
                PatternSource::Llm,
            )],
            log_messages: vec![
                format!("Detected email pattern: {}", detected.pattern),
                format!("Email pattern detection reason: {}", detected.reason),
            ],
        };
    }

    let reason = detected
        .map(|d| d.reason.trim())
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_DETECTION_REASON);

    PatternDecision {
        pattern: DEFAULT_EMAIL_PATTERN,
        records: Vec::new(),
        log_messages: vec![
            format!(
                "Email pattern could not be determined from web search. Using default pattern: {DEFAULT_EMAIL_PATTERN}"
            ),
            format!("Email pattern detection reason: {reason}"),
        ],
    }
}
