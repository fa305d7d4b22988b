//! EmailHippo API verifier.
//!
//! One `GET {base}/v3/more/json/{key}/{email}` per address. Bad credentials
//! and unreadable bodies are errors; outages and 5xx answers become verdicts
//! flagged `provider_error`, which the coordinator uses but never caches.

use std::time::Duration;

use async_trait::async_trait;
use leadscan_core::{
    BoxError, EmailVerificationResult, EmailVerifier, HippoDetails, VerificationDetails,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode, Url};

use crate::error::VerifyError;
use crate::types::HippoResponse;

const DEFAULT_BASE_URL: &str = "https://api.hippoapi.com";
const DEFAULT_CACHE_MAX_AGE_DAYS: u32 = 180;
const SNIPPET_CHARS: usize = 500;

/// Characters left unescaped in a path segment, matching what browsers'
/// component encoding leaves alone. `@` and `/` are always escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Client for the EmailHippo mailbox verification API.
#[derive(Debug, Clone)]
pub struct EmailHippoClient {
    client: Client,
    api_key: String,
    base_url: Url,
    cache_max_age_days: u32,
}

impl EmailHippoClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, VerifyError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VerifyError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadscan/0.1 (email-verification)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| VerifyError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            cache_max_age_days: DEFAULT_CACHE_MAX_AGE_DAYS,
        })
    }

    #[must_use]
    pub fn with_cache_max_age_days(mut self, days: u32) -> Self {
        self.cache_max_age_days = days;
        self
    }

    /// Verify one address.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::Unauthorized`] on HTTP 401 or 403.
    /// - [`VerifyError::Deserialize`] if a 2xx body is not the expected JSON.
    /// - [`VerifyError::InvalidBaseUrl`] if the lookup URL cannot be built.
    pub async fn verify_email(&self, email: &str) -> Result<EmailVerificationResult, VerifyError> {
        let url = self.lookup_url(email)?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                // The URL carries the API key; keep it out of logs and verdicts.
                let e = e.without_url();
                tracing::warn!(email, error = %e, "EmailHippo request failed");
                return Ok(provider_failure(email, &e.to_string()));
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(VerifyError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            tracing::warn!(email, status = status.as_u16(), "EmailHippo returned an error status");
            return Ok(provider_failure(
                email,
                &format!("Request failed with status code {}", status.as_u16()),
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let e = e.without_url();
                tracing::warn!(email, error = %e, "failed to read EmailHippo response body");
                return Ok(provider_failure(email, &e.to_string()));
            }
        };

        let parsed: HippoResponse =
            serde_json::from_str(&body).map_err(|source| VerifyError::Deserialize {
                context: format!("EmailHippo response for {email}"),
                source,
            })?;

        let result = verdict_from_response(email, parsed, &body);
        tracing::debug!(
            email,
            deliverable = result.is_deliverable,
            has_mx = result.has_mx_records,
            "EmailHippo verdict"
        );
        Ok(result)
    }

    pub(crate) fn lookup_url(&self, email: &str) -> Result<Url, VerifyError> {
        let path = format!(
            "v3/more/json/{}/{}",
            utf8_percent_encode(&self.api_key, PATH_SEGMENT),
            utf8_percent_encode(email, PATH_SEGMENT)
        );
        self.base_url
            .join(&path)
            .map_err(|e| VerifyError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl EmailVerifier for EmailHippoClient {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError> {
        Ok(self.verify_email(email).await?)
    }

    fn cache_max_age_days(&self) -> u32 {
        self.cache_max_age_days
    }
}

/// Map a decoded response onto a verdict. The verdict is keyed by the
/// address that was asked about, not the one the provider echoes back.
pub(crate) fn verdict_from_response(
    email: &str,
    response: HippoResponse,
    raw_body: &str,
) -> EmailVerificationResult {
    let verification = response.email_verification;
    let mailbox = verification.mailbox_verification;
    let dns = verification.dns_verification;
    let syntax = verification.syntax_verification;

    let mailbox_ok = mailbox
        .result
        .as_deref()
        .is_some_and(|r| r.eq_ignore_ascii_case("ok"));
    let is_spam_trap = response.spam_trap_assess.is_spam_trap;
    let is_disposable = response.spam_assess.is_disposable_email_address;
    let is_deliverable = mailbox_ok && is_spam_trap != Some(true) && is_disposable != Some(true);
    let has_mx_records = dns.is_domain_has_mx_records == Some(true);

    let mut parts = Vec::new();
    if let Some(result) = mailbox.result.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Mailbox={result}"));
    }
    if let Some(reason) = mailbox.reason.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("MailboxReason={reason}"));
    }
    if let Some(rec) = response
        .send_assess
        .send_recommendation
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        parts.push(format!("SendRecommendation={rec}"));
    }
    if let Some(level) = response.hippo_trust.level.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("TrustLevel={level}"));
    }
    if let Some(score) = response.spam_assess.overall_risk_score {
        parts.push(format!("OverallRiskScore={score}"));
    }
    let reason = (!parts.is_empty()).then(|| parts.join(", "));

    let details = HippoDetails {
        mailbox_result: mailbox.result,
        mailbox_reason: mailbox.reason,
        syntax_is_valid: syntax.is_syntax_valid,
        syntax_reason: syntax.reason,
        domain_has_dns_record: dns.is_domain_has_dns_record,
        domain_has_mx_records: dns.is_domain_has_mx_records,
        inbox_quality_score: response.send_assess.inbox_quality_score,
        send_recommendation: response.send_assess.send_recommendation,
        is_disposable_email_address: is_disposable,
        is_spam_trap,
        overall_risk_score: response.spam_assess.overall_risk_score,
        hippo_trust_score: response.hippo_trust.score,
        hippo_trust_level: response.hippo_trust.level,
        mail_server_location: response.infrastructure.mail.mail_server_location,
        mail_service_type_id: response.infrastructure.mail.service_type_id,
        raw_response_snippet: Some(raw_body.chars().take(SNIPPET_CHARS).collect()),
        ..HippoDetails::default()
    };

    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable,
        has_mx_records,
        reason,
        details: VerificationDetails::EmailHippo(details),
    }
}

fn provider_failure(email: &str, message: &str) -> EmailVerificationResult {
    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable: false,
        has_mx_records: false,
        reason: Some(format!("EmailHippo API call failed: {message}")),
        details: VerificationDetails::EmailHippo(HippoDetails {
            provider_error: true,
            ..HippoDetails::default()
        }),
    }
}
