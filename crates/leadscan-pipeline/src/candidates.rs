//! Expanding a contact's name into every syntactically possible address.

use leadscan_core::{EmailPattern, EmailType, FoundContact, DEFAULT_EMAIL_PATTERN};

/// Prior confidence of the address built with the decided pattern.
pub const PRIMARY_BASE_CONFIDENCE: f64 = 0.7;
/// Prior confidence of every other permutation.
pub const ALTERNATIVE_BASE_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAddress {
    pub value: String,
    pub pattern: EmailPattern,
    pub email_type: EmailType,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailCandidates {
    pub primary: EmailAddress,
    /// Never contains `primary.value`.
    pub alternatives: Vec<EmailAddress>,
}

impl EmailCandidates {
    pub fn iter(&self) -> impl Iterator<Item = &EmailAddress> {
        std::iter::once(&self.primary).chain(self.alternatives.iter())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub domain: &'a str,
    /// Defaults to `f-last` when unset.
    pub primary_pattern: Option<EmailPattern>,
}

/// A discovered contact together with its generated addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactCandidates {
    pub contact: FoundContact,
    pub candidates: EmailCandidates,
}

fn sanitize_name_part(part: &str) -> String {
    part.trim()
        .replace(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'), "")
        .to_lowercase()
}

fn address(pattern: EmailPattern, first: &str, last: &str, domain: &str) -> EmailAddress {
    EmailAddress {
        value: format!("{}@{domain}", pattern.local_part(first, last)),
        pattern,
        email_type: EmailType::Personal,
        confidence: ALTERNATIVE_BASE_CONFIDENCE,
    }
}

/// Build all 13 addresses and split them into primary and alternatives.
///
/// Empty name segments yield degenerate addresses rather than an error.
#[must_use]
pub fn generate_email_addresses(request: CandidateRequest<'_>) -> EmailCandidates {
    let first = sanitize_name_part(request.first_name);
    let last = sanitize_name_part(request.last_name);
    let domain = request.domain.trim().to_lowercase();

    let [head, tail @ ..] = EmailPattern::ALL;
    let head = address(head, &first, &last, &domain);
    let tail = tail
        .iter()
        .map(|p| address(*p, &first, &last, &domain))
        .collect();

    select_primary(
        head,
        tail,
        request.primary_pattern.unwrap_or(DEFAULT_EMAIL_PATTERN),
    )
}

/// Pick the entry built with `pattern` as primary, or the first entry when
/// no entry carries it. Alternatives exclude anything equal to the primary
/// address.
pub(crate) fn select_primary(
    head: EmailAddress,
    tail: Vec<EmailAddress>,
    pattern: EmailPattern,
) -> EmailCandidates {
    let mut entries = Vec::with_capacity(tail.len() + 1);
    entries.push(head);
    entries.extend(tail);

    let index = entries
        .iter()
        .position(|e| e.pattern == pattern)
        .unwrap_or(0);
    let mut primary = entries.remove(index);
    primary.confidence = PRIMARY_BASE_CONFIDENCE;

    let alternatives = entries
        .into_iter()
        .filter(|e| e.value != primary.value)
        .map(|mut e| {
            e.confidence = ALTERNATIVE_BASE_CONFIDENCE;
            e
        })
        .collect();

    EmailCandidates {
        primary,
        alternatives,
    }
}

/// Generate candidates for every contact against `domain`, using `pattern`
/// for the primary.
#[must_use]
pub fn create_contact_and_email_candidates(
    contacts: &[FoundContact],
    domain: &str,
    pattern: EmailPattern,
) -> Vec<ContactCandidates> {
    contacts
        .iter()
        .map(|contact| ContactCandidates {
            candidates: generate_email_addresses(CandidateRequest {
                first_name: &contact.first_name,
                last_name: &contact.last_name,
                domain,
                primary_pattern: Some(pattern),
            }),
            contact: contact.clone(),
        })
        .collect()
}
