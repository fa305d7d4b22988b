use thiserror::Error;

/// Errors that stop verification outright. Provider outages are not errors:
/// they come back as verdicts flagged `provider_error` / `lookup_failed`.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the API key.
    #[error("EmailHippo rejected the API key (status {status})")]
    Unauthorized { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bulk export is missing required columns.
    #[error("invalid EmailHippo CSV {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
