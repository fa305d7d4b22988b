#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_retry_backoff_base_ms: u64,
    pub email_hippo_api_key: Option<String>,
    pub email_hippo_base_url: String,
    pub verifier_timeout_secs: u64,
    pub hippo_cache_max_age_days: u32,
    pub dns_cache_max_age_days: u32,
    pub pattern_max_age_days: u32,
    pub contact_cache_max_age_days: u32,
    pub scan_concurrency: usize,
    pub verify_concurrency: usize,
    pub call_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_retry_backoff_base_ms", &self.llm_retry_backoff_base_ms)
            .field(
                "email_hippo_api_key",
                &self.email_hippo_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("email_hippo_base_url", &self.email_hippo_base_url)
            .field("verifier_timeout_secs", &self.verifier_timeout_secs)
            .field("hippo_cache_max_age_days", &self.hippo_cache_max_age_days)
            .field("dns_cache_max_age_days", &self.dns_cache_max_age_days)
            .field("pattern_max_age_days", &self.pattern_max_age_days)
            .field(
                "contact_cache_max_age_days",
                &self.contact_cache_max_age_days,
            )
            .field("scan_concurrency", &self.scan_concurrency)
            .field("verify_concurrency", &self.verify_concurrency)
            .field("call_timeout_secs", &self.call_timeout_secs)
            .finish()
    }
}
