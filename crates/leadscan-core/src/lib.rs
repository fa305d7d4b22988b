use thiserror::Error;

pub mod app_config;
pub mod companies;
pub mod config;
pub mod department;
pub mod pattern;
pub mod ports;
pub mod records;
pub mod scan;
pub mod verification;

pub use app_config::{AppConfig, Environment};
pub use companies::{load_scan_targets, normalize_domain, CompaniesFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use department::{classify_department, department_search_keywords, DepartmentCategory};
pub use pattern::{DetectedPattern, EmailPattern, LearnedPattern, DEFAULT_EMAIL_PATTERN};
pub use ports::{
    BoxError, CompanyScanRawStore, ContactFinder, ContactSearchCache, EmailPatternDetector,
    EmailPatternRepository, EmailVerificationRepository, EmailVerifier, IdGenerator, LeadBatch,
    LeadExporter, UuidGenerator,
};
pub use records::{
    CompanyRecord, ContactRecord, EmailCandidateRecord, EmailPatternRecord, EmailType,
    PatternSource,
};
pub use scan::{
    CompanyInput, CompanyScanRawData, ContactSource, FoundContact, PatternDecision, ScanTarget,
};
pub use verification::{
    is_within_days, DnsMxDetails, EmailVerificationResult, HippoDetails, VerificationDetails,
    VerificationSource,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read company list {path}: {source}")]
    CompaniesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse company list {path}: {reason}")]
    CompaniesFileParse { path: String, reason: String },

    #[error("invalid company list: {0}")]
    Validation(String),
}

/// A record failed its construction-time checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be non-empty")]
    Empty { field: &'static str },

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("confidence must be a finite number, got {0}")]
    InvalidConfidence(f64),

    #[error("unknown email pattern: {0}")]
    UnknownPattern(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("success count {success} exceeds total count {total}")]
    CountMismatch { success: i64, total: i64 },

    #[error("{field} must not be negative")]
    NegativeCount { field: &'static str },
}
