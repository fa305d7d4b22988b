//! Offline unit tests for leadscan-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use leadscan_core::{AppConfig, EmailPattern, EmailPatternRecord, Environment};
use leadscan_db::{EmailPatternRow, EmailVerificationRow, PoolConfig};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        openai_api_key: None,
        openai_base_url: "https://api.openai.com/v1".to_string(),
        openai_model: "gpt-5-mini".to_string(),
        llm_timeout_secs: 180,
        llm_max_retries: 2,
        llm_retry_backoff_base_ms: 1000,
        email_hippo_api_key: None,
        email_hippo_base_url: "https://api.hippoapi.com".to_string(),
        verifier_timeout_secs: 30,
        hippo_cache_max_age_days: 180,
        dns_cache_max_age_days: 90,
        pattern_max_age_days: 365,
        contact_cache_max_age_days: 30,
        scan_concurrency: 4,
        verify_concurrency: 8,
        call_timeout_secs: 300,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn verification_row_decodes_source_tagged_details() {
    let row = EmailVerificationRow {
        email: "taro.yamada@example.com".to_string(),
        source: "dns_mx".to_string(),
        is_deliverable: true,
        has_mx_records: true,
        reason: Some("MX records found".to_string()),
        details: serde_json::json!({
            "source": "dns_mx",
            "mx_hosts": ["mx1.example.com"],
            "lookup_failed": false
        }),
        verified_at: Utc::now(),
    };

    let result = row.into_result().unwrap();
    assert_eq!(result.source(), leadscan_core::VerificationSource::DnsMx);
    assert!(result.has_mx_records);
}

#[test]
fn verification_row_with_unknown_source_tag_fails() {
    let row = EmailVerificationRow {
        email: "taro.yamada@example.com".to_string(),
        source: "smtp".to_string(),
        is_deliverable: true,
        has_mx_records: true,
        reason: None,
        details: serde_json::json!({ "source": "smtp" }),
        verified_at: Utc::now(),
    };

    assert!(matches!(
        row.into_result(),
        Err(leadscan_db::DbError::Json(_))
    ));
}

#[test]
fn decision_pattern_row_has_no_ledger_fields() {
    let row = EmailPatternRow {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        pattern: "f-last".to_string(),
        reason: "published addresses use an initial".to_string(),
        domain: None,
        source: Some("llm".to_string()),
        sample_email: None,
        verified_at: None,
        success_count: None,
        total_count: None,
    };

    let record = EmailPatternRecord::try_from(row).unwrap();
    assert_eq!(record.pattern, EmailPattern::InitialDashLast);
    assert!(record.domain.is_none());
    assert!(record.success_count.is_none());
}
