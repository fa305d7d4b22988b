//! Wire shapes of the EmailHippo v3 `more` endpoint. Every field is optional:
//! the provider omits sections it could not evaluate.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HippoResponse {
    #[serde(default)]
    pub email_verification: EmailVerificationSection,
    #[serde(default)]
    pub infrastructure: InfrastructureSection,
    #[serde(default)]
    pub send_assess: SendAssess,
    #[serde(default)]
    pub spam_assess: SpamAssess,
    #[serde(default)]
    pub spam_trap_assess: SpamTrapAssess,
    #[serde(default)]
    pub hippo_trust: HippoTrust,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmailVerificationSection {
    #[serde(default)]
    pub syntax_verification: SyntaxVerification,
    #[serde(default)]
    pub dns_verification: DnsVerification,
    #[serde(default)]
    pub mailbox_verification: MailboxVerification,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SyntaxVerification {
    pub is_syntax_valid: Option<bool>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DnsVerification {
    pub is_domain_has_dns_record: Option<bool>,
    pub is_domain_has_mx_records: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MailboxVerification {
    pub result: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InfrastructureSection {
    #[serde(default)]
    pub mail: MailInfrastructure,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MailInfrastructure {
    pub service_type_id: Option<String>,
    pub mail_server_location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendAssess {
    pub inbox_quality_score: Option<f64>,
    pub send_recommendation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpamAssess {
    pub is_disposable_email_address: Option<bool>,
    pub overall_risk_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpamTrapAssess {
    pub is_spam_trap: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HippoTrust {
    pub score: Option<f64>,
    pub level: Option<String>,
}
