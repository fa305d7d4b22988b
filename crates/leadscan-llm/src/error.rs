use thiserror::Error;

/// Errors returned by the structured-output client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("LLM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body or the model's JSON output did not match the
    /// expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response carried no `output_text` content.
    #[error("LLM response for {0} contained no output text")]
    EmptyOutput(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
