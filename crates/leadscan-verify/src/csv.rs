//! Verdicts served from an EmailHippo bulk-verification export instead of
//! the live API.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use leadscan_core::{
    BoxError, EmailVerificationResult, EmailVerifier, HippoDetails, VerificationDetails,
};

use crate::error::VerifyError;

const DEFAULT_CACHE_MAX_AGE_DAYS: u32 = 180;

#[derive(Debug, Clone)]
pub struct EmailHippoCsvVerifier {
    verdicts: HashMap<String, EmailVerificationResult>,
    cache_max_age_days: u32,
}

impl EmailHippoCsvVerifier {
    /// Load an export file.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Io`] if the file cannot be read, or
    /// [`VerifyError::Csv`] if the header lacks `CheckedEmailAddress` or
    /// `Status`.
    pub fn from_path(path: &Path) -> Result<Self, VerifyError> {
        let content = std::fs::read_to_string(path).map_err(|source| VerifyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let verifier = Self::parse(&content).map_err(|reason| VerifyError::Csv {
            path: path.display().to_string(),
            reason,
        })?;
        tracing::info!(path = %path.display(), rows = verifier.len(), "loaded EmailHippo export");
        Ok(verifier)
    }

    /// Parse export content. The delimiter is a tab when the header holds
    /// one, otherwise a comma. Rows too short to carry the address and
    /// status are skipped.
    ///
    /// # Errors
    ///
    /// Returns a message naming the missing required column.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());

        let Some(header) = lines.next() else {
            return Ok(Self::from_verdicts(HashMap::new()));
        };
        let delimiter = if header.contains('\t') { '\t' } else { ',' };
        let columns: Vec<&str> = header.split(delimiter).map(str::trim).collect();
        let index_of = |name: &str| columns.iter().position(|c| *c == name);

        let (Some(email_idx), Some(status_idx)) =
            (index_of("CheckedEmailAddress"), index_of("Status"))
        else {
            return Err("header must include CheckedEmailAddress and Status columns".to_string());
        };
        let info_idx = index_of("AdditionalStatusInfo");
        let domain_cc_idx = index_of("DomainCountryCode");
        let server_cc_idx = index_of("MailServerCountryCode");

        let mut verdicts = HashMap::new();
        for line in lines {
            let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
            let optional = |idx: Option<usize>| {
                idx.and_then(|i| fields.get(i))
                    .filter(|v| !v.is_empty())
                    .map(|v| (*v).to_string())
            };

            let (Some(email), Some(status)) = (fields.get(email_idx), fields.get(status_idx))
            else {
                continue;
            };
            if email.is_empty() {
                continue;
            }

            let additional_status_info = optional(info_idx);
            let mut reason = format!("EmailHippo Status={status}");
            if let Some(info) = &additional_status_info {
                reason.push_str(&format!(", Info={info}"));
            }

            let result = EmailVerificationResult {
                email: (*email).to_string(),
                is_deliverable: *status == "Ok",
                has_mx_records: true,
                reason: Some(reason),
                details: VerificationDetails::EmailHippo(HippoDetails {
                    status: Some((*status).to_string()),
                    additional_status_info,
                    domain_country_code: optional(domain_cc_idx),
                    mail_server_country_code: optional(server_cc_idx),
                    ..HippoDetails::default()
                }),
            };
            verdicts.insert(email.to_lowercase(), result);
        }

        Ok(Self::from_verdicts(verdicts))
    }

    fn from_verdicts(verdicts: HashMap<String, EmailVerificationResult>) -> Self {
        Self {
            verdicts,
            cache_max_age_days: DEFAULT_CACHE_MAX_AGE_DAYS,
        }
    }

    #[must_use]
    pub fn with_cache_max_age_days(mut self, days: u32) -> Self {
        self.cache_max_age_days = days;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// The exported verdict for `email` (case-insensitive), or a
    /// non-deliverable `provider_error` verdict when the export has no row.
    #[must_use]
    pub fn lookup(&self, email: &str) -> EmailVerificationResult {
        if let Some(hit) = self.verdicts.get(&email.to_lowercase()) {
            return EmailVerificationResult {
                email: email.to_string(),
                ..hit.clone()
            };
        }
        EmailVerificationResult {
            email: email.to_string(),
            is_deliverable: false,
            has_mx_records: false,
            reason: Some("Not found in EmailHippo CSV".to_string()),
            details: VerificationDetails::EmailHippo(HippoDetails {
                provider_error: true,
                ..HippoDetails::default()
            }),
        }
    }
}

#[async_trait]
impl EmailVerifier for EmailHippoCsvVerifier {
    async fn verify(&self, email: &str) -> Result<EmailVerificationResult, BoxError> {
        Ok(self.lookup(email))
    }

    fn cache_max_age_days(&self) -> u32 {
        self.cache_max_age_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAB_EXPORT: &str = "CheckedEmailAddress\tStatus\tAdditionalStatusInfo\tDomainCountryCode\tMailServerCountryCode\n\
        taro.yamada@example.com\tOk\t\tJP\tUS\n\
        t.suzuki@example.com\tBad\tMailboxDoesNotExist\tJP\tUS\n";

    #[test]
    fn tab_export_is_parsed() {
        let verifier = EmailHippoCsvVerifier::parse(TAB_EXPORT).unwrap();
        assert_eq!(verifier.len(), 2);

        let ok = verifier.lookup("taro.yamada@example.com");
        assert!(ok.is_deliverable);
        assert!(ok.has_mx_records);
        assert_eq!(ok.reason.as_deref(), Some("EmailHippo Status=Ok"));
        let VerificationDetails::EmailHippo(details) = &ok.details else {
            panic!("expected hippo details");
        };
        assert_eq!(details.domain_country_code.as_deref(), Some("JP"));
        assert!(details.additional_status_info.is_none());

        let bad = verifier.lookup("t.suzuki@example.com");
        assert!(!bad.is_deliverable);
        assert_eq!(
            bad.reason.as_deref(),
            Some("EmailHippo Status=Bad, Info=MailboxDoesNotExist")
        );
        assert!(!bad.is_transient_failure());
    }

    #[test]
    fn comma_export_with_extra_columns_is_parsed() {
        let content = "Id,Status,CheckedEmailAddress\r\n1,Ok,a@example.com\r\n2,Ok\r\n";
        let verifier = EmailHippoCsvVerifier::parse(content).unwrap();
        assert_eq!(verifier.len(), 1);
        assert!(verifier.lookup("A@Example.com").is_deliverable);
        assert_eq!(verifier.lookup("A@Example.com").email, "A@Example.com");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = EmailHippoCsvVerifier::parse("Email,Status\na@example.com,Ok\n").unwrap_err();
        assert!(err.contains("CheckedEmailAddress"));
    }

    #[test]
    fn empty_content_yields_empty_verifier() {
        assert!(EmailHippoCsvVerifier::parse("").unwrap().is_empty());
    }

    #[test]
    fn address_absent_from_export_is_transient() {
        let verifier = EmailHippoCsvVerifier::parse(TAB_EXPORT).unwrap();
        let miss = verifier.lookup("nobody@example.com");
        assert!(!miss.is_deliverable);
        assert_eq!(miss.reason.as_deref(), Some("Not found in EmailHippo CSV"));
        assert!(miss.is_transient_failure());
    }

    #[test]
    fn unreadable_path_is_io_error() {
        let err = EmailHippoCsvVerifier::from_path(Path::new("/nonexistent/export.csv")).unwrap_err();
        assert!(matches!(err, VerifyError::Io { .. }));
    }
}
