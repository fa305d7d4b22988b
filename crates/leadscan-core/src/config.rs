use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("LEADSCAN_ENV", "development"))?;
    let log_level = or_default("LEADSCAN_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("LEADSCAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LEADSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let openai_model = or_default("OPENAI_MODEL", "gpt-5-mini");
    let llm_timeout_secs = parse_u64("LEADSCAN_LLM_TIMEOUT_SECS", "180")?;
    let llm_max_retries = parse_u32("LEADSCAN_LLM_MAX_RETRIES", "2")?;
    let llm_retry_backoff_base_ms = parse_u64("LEADSCAN_LLM_RETRY_BACKOFF_BASE_MS", "1000")?;

    let email_hippo_api_key = optional("EMAIL_HIPPO_API_KEY");
    let email_hippo_base_url = or_default("EMAIL_HIPPO_BASE_URL", "https://api.hippoapi.com");
    let verifier_timeout_secs = parse_u64("LEADSCAN_VERIFIER_TIMEOUT_SECS", "30")?;

    let hippo_cache_max_age_days = parse_u32("LEADSCAN_HIPPO_CACHE_MAX_AGE_DAYS", "180")?;
    let dns_cache_max_age_days = parse_u32("LEADSCAN_DNS_CACHE_MAX_AGE_DAYS", "90")?;
    let pattern_max_age_days = parse_u32("LEADSCAN_PATTERN_MAX_AGE_DAYS", "365")?;
    let contact_cache_max_age_days = parse_u32("LEADSCAN_CONTACT_CACHE_MAX_AGE_DAYS", "30")?;

    let scan_concurrency = parse_positive_usize("LEADSCAN_SCAN_CONCURRENCY", "4")?;
    let verify_concurrency = parse_positive_usize("LEADSCAN_VERIFY_CONCURRENCY", "8")?;
    let call_timeout_secs = parse_u64("LEADSCAN_CALL_TIMEOUT_SECS", "300")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        openai_api_key,
        openai_base_url,
        openai_model,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_backoff_base_ms,
        email_hippo_api_key,
        email_hippo_base_url,
        verifier_timeout_secs,
        hippo_cache_max_age_days,
        dns_cache_max_age_days,
        pattern_max_age_days,
        contact_cache_max_age_days,
        scan_concurrency,
        verify_concurrency,
        call_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSCAN_ENV".to_string(),
            reason: format!("unrecognized environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
