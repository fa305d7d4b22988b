//! Web-search email convention detection.

use async_trait::async_trait;
use leadscan_core::{
    BoxError, DetectedPattern, EmailPattern, EmailPatternDetector, DEFAULT_EMAIL_PATTERN,
};
use serde_json::json;

use crate::client::OpenAiClient;
use crate::error::LlmError;

const SCHEMA_NAME: &str = "email_pattern";

/// [`EmailPatternDetector`] that asks the model to infer the convention from
/// published addresses on the domain.
#[derive(Debug, Clone)]
pub struct LlmEmailPatternDetector {
    client: OpenAiClient,
}

impl LlmEmailPatternDetector {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns the [`LlmError`] from the underlying call. A pattern string
    /// outside the known set is [`LlmError::Deserialize`].
    pub async fn detect_pattern(&self, domain: &str) -> Result<DetectedPattern, LlmError> {
        let detected: DetectedPattern = self
            .client
            .structured_output(&pattern_prompt(domain), SCHEMA_NAME, &pattern_schema())
            .await?;
        tracing::info!(
            domain,
            pattern = %detected.pattern,
            found = detected.found,
            "email pattern detection returned"
        );
        Ok(detected)
    }
}

#[async_trait]
impl EmailPatternDetector for LlmEmailPatternDetector {
    async fn detect(&self, domain: &str) -> Result<Option<DetectedPattern>, BoxError> {
        Ok(Some(self.detect_pattern(domain).await?))
    }
}

pub(crate) fn pattern_prompt(domain: &str) -> String {
    let choices: String = EmailPattern::ALL
        .iter()
        .map(|p| format!("- \"{p}\": {}@{domain}\n", p.local_part("first", "last")))
        .collect();

    format!(
        "Search the web for email addresses published under the domain {domain} and infer \
         the convention most of them follow.\n\n\
         Choose exactly one of these patterns (\"first\" is the given name, \"last\" the \
         family name, \"f\" the first letter of the given name):\n{choices}\n\
         If no published addresses are found or no convention is clear, set found to false \
         and pattern to \"{DEFAULT_EMAIL_PATTERN}\".\n\
         In reason, briefly state the evidence for the choice, or why none was found. Do \
         not add citations."
    )
}

pub(crate) fn pattern_schema() -> serde_json::Value {
    let names: Vec<&str> = EmailPattern::ALL.iter().map(|p| p.as_str()).collect();
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["pattern", "reason", "found"],
        "properties": {
            "pattern": { "type": "string", "enum": names },
            "reason": { "type": "string" },
            "found": { "type": "boolean" }
        }
    })
}
