//! HTTP client for the OpenAI Responses API with web search and strict JSON
//! schema output.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{
    ApiErrorEnvelope, JsonSchemaFormat, Reasoning, ResponsesEnvelope, ResponsesRequest,
    TextOptions, Tool,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Client for structured-output calls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl OpenAiClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LlmError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadscan/0.1 (contact-research)")
            .build()?;

        // A single trailing slash so that `join("responses")` appends a
        // segment instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LlmError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Run `prompt` with the web search tool and decode the model's JSON
    /// answer, which is constrained to `schema`, into `T`.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Http`] / [`LlmError::Api`] after retries are exhausted.
    /// - [`LlmError::EmptyOutput`] if the response holds no output text.
    /// - [`LlmError::Deserialize`] if the envelope or the answer does not
    ///   match the expected shape.
    pub async fn structured_output<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<T, LlmError> {
        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
            tools: vec![Tool { kind: "web_search" }],
            text: TextOptions {
                format: JsonSchemaFormat {
                    kind: "json_schema",
                    name: schema_name,
                    schema,
                    strict: true,
                },
            },
            reasoning: Reasoning { effort: "low" },
        };

        let url = self.responses_url()?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_json(&url, &request)
        })
        .await?;

        let envelope: ResponsesEnvelope =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: format!("{schema_name} response envelope"),
                source: e,
            })?;
        let text = envelope
            .output_text()
            .ok_or_else(|| LlmError::EmptyOutput(schema_name.to_string()))?;

        serde_json::from_str(text).map_err(|e| LlmError::Deserialize {
            context: format!("{schema_name} output"),
            source: e,
        })
    }

    fn responses_url(&self) -> Result<Url, LlmError> {
        self.base_url
            .join("responses")
            .map_err(|e| LlmError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends one POST and returns the body on 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] on network failure or
    /// [`LlmError::Api`] for a non-2xx status.
    async fn post_json(
        &self,
        url: &Url,
        request: &ResponsesRequest<'_>,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
