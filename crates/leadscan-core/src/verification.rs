//! Deliverability verdicts, tagged by the verifier that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    /// Mailbox-level verification; its verdict overrides prior confidence.
    EmailHippo,
    /// MX-record presence only.
    DnsMx,
}

impl VerificationSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationSource::EmailHippo => "email_hippo",
            VerificationSource::DnsMx => "dns_mx",
        }
    }
}

impl std::fmt::Display for VerificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrichment returned by the mailbox verification provider, either from
/// its API or from a bulk-export CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HippoDetails {
    pub mailbox_result: Option<String>,
    pub mailbox_reason: Option<String>,
    pub syntax_is_valid: Option<bool>,
    pub syntax_reason: Option<String>,
    pub domain_has_dns_record: Option<bool>,
    pub domain_has_mx_records: Option<bool>,
    pub inbox_quality_score: Option<f64>,
    pub send_recommendation: Option<String>,
    pub is_disposable_email_address: Option<bool>,
    pub is_spam_trap: Option<bool>,
    pub overall_risk_score: Option<f64>,
    pub hippo_trust_score: Option<f64>,
    pub hippo_trust_level: Option<String>,
    pub mail_server_location: Option<String>,
    pub mail_service_type_id: Option<String>,
    pub status: Option<String>,
    pub additional_status_info: Option<String>,
    pub domain_country_code: Option<String>,
    pub mail_server_country_code: Option<String>,
    pub raw_response_snippet: Option<String>,
    /// The provider did not produce a verdict (API failure, missing row).
    #[serde(default)]
    pub provider_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsMxDetails {
    pub mx_hosts: Vec<String>,
    /// The resolver failed for a reason other than "no records".
    #[serde(default)]
    pub lookup_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum VerificationDetails {
    EmailHippo(HippoDetails),
    DnsMx(DnsMxDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailVerificationResult {
    pub email: String,
    pub is_deliverable: bool,
    pub has_mx_records: bool,
    pub reason: Option<String>,
    pub details: VerificationDetails,
}

impl EmailVerificationResult {
    #[must_use]
    pub fn source(&self) -> VerificationSource {
        match self.details {
            VerificationDetails::EmailHippo(_) => VerificationSource::EmailHippo,
            VerificationDetails::DnsMx(_) => VerificationSource::DnsMx,
        }
    }

    /// A verdict that reflects a provider-side failure rather than a real
    /// answer. These are used for the current scan but never cached.
    #[must_use]
    pub fn is_transient_failure(&self) -> bool {
        match &self.details {
            VerificationDetails::EmailHippo(d) => d.provider_error,
            VerificationDetails::DnsMx(d) => d.lookup_failed,
        }
    }
}

/// `true` when `recorded_at` is not in the future and no more than
/// `max_age_days` old at `now`.
#[must_use]
pub fn is_within_days(recorded_at: DateTime<Utc>, now: DateTime<Utc>, max_age_days: u32) -> bool {
    let age = now.signed_duration_since(recorded_at);
    age >= chrono::Duration::zero() && age <= chrono::Duration::days(i64::from(max_age_days))
}
