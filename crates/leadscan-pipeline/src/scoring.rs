use leadscan_core::{EmailVerificationResult, VerificationSource};

const UNDELIVERABLE_CAP: f64 = 0.1;
const MX_PRESENT_BONUS: f64 = 0.1;
const MX_MISSING_PENALTY: f64 = 0.3;

/// Adjust a prior confidence with verification evidence.
///
/// A mailbox-level verdict overrides the prior; an MX-only verdict nudges it.
/// Without evidence the prior is returned unchanged.
#[must_use]
pub fn adjust_email_confidence(base: f64, verification: Option<&EmailVerificationResult>) -> f64 {
    let Some(verification) = verification else {
        return base;
    };

    match verification.source() {
        VerificationSource::EmailHippo if verification.is_deliverable => 1.0,
        VerificationSource::EmailHippo => base.min(UNDELIVERABLE_CAP).clamp(0.0, 1.0),
        VerificationSource::DnsMx if verification.has_mx_records => {
            (base + MX_PRESENT_BONUS).clamp(0.0, 1.0)
        }
        VerificationSource::DnsMx => (base - MX_MISSING_PENALTY).clamp(0.0, 1.0),
    }
}
