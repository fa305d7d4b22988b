//! Live integration tests for leadscan-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/leadscan-db/`).

use chrono::Utc;
use leadscan_core::{
    CompanyInput, CompanyRecord, CompanyScanRawData, ContactRecord, DnsMxDetails,
    EmailCandidateRecord, EmailPattern, EmailPatternRecord, EmailType, EmailVerificationResult,
    FoundContact, LeadBatch, PatternDecision, PatternSource, VerificationDetails,
};
use leadscan_db::{
    export_leads, find_recent_contact_search, find_recent_learned_pattern,
    find_recent_verification, get_company_by_domain, list_candidates_for_company,
    list_domain_patterns, load_company_scan, save_company_scan, save_contact_search,
    upsert_learned_pattern, upsert_verification,
};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dns_result(email: &str, has_mx: bool) -> EmailVerificationResult {
    EmailVerificationResult {
        email: email.to_string(),
        is_deliverable: has_mx,
        has_mx_records: has_mx,
        reason: Some("MX records found".to_string()),
        details: VerificationDetails::DnsMx(DnsMxDetails {
            mx_hosts: vec!["mx1.example.com".to_string()],
            lookup_failed: false,
        }),
    }
}

async fn backdate_verification(pool: &PgPool, email: &str, days: i32) {
    sqlx::query(
        "UPDATE email_verifications \
         SET verified_at = NOW() - make_interval(days => $2) \
         WHERE email = $1",
    )
    .bind(email)
    .bind(days)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("backdate failed for {email}: {e}"));
}

fn ledger_entry(success: i64, total: i64, sample: Option<&str>) -> EmailPatternRecord {
    EmailPatternRecord {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        pattern: EmailPattern::FirstDotLast,
        reason: "learned from mailbox verification of first.last addresses".to_string(),
        domain: Some("example.com".to_string()),
        source: Some(PatternSource::EmailHippo),
        sample_email: sample.map(str::to_string),
        verified_at: Some(Utc::now()),
        success_count: Some(success),
        total_count: Some(total),
    }
}

fn found(first: &str, last: &str) -> FoundContact {
    FoundContact {
        name: format!("{first} {last}"),
        position: "Manager".to_string(),
        department: "営業部".to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        sources: Vec::new(),
    }
}

fn batch(department: &str, contacts: &[FoundContact]) -> LeadBatch {
    let company = CompanyRecord::new(Uuid::new_v4(), "Example KK", "example.com").unwrap();
    let mut batch = LeadBatch {
        department: department.to_string(),
        companies: vec![company.clone()],
        ..LeadBatch::default()
    };

    for found in contacts {
        let contact = ContactRecord::new(Uuid::new_v4(), company.id, found).unwrap();
        for (pattern, confidence, is_primary) in [
            (EmailPattern::InitialDashLast, 1.0, true),
            (EmailPattern::FirstDotLast, 0.3, false),
        ] {
            batch.email_candidates.push(EmailCandidateRecord {
                id: Uuid::new_v4(),
                contact_id: contact.id,
                email: format!(
                    "{}@example.com",
                    pattern.local_part(&found.first_name, &found.last_name)
                ),
                is_primary,
                confidence,
                email_type: EmailType::Personal,
                pattern: Some(pattern),
                is_deliverable: Some(is_primary),
                has_mx_records: Some(true),
                verification_reason: None,
            });
        }
        batch.contacts.push(contact);
    }

    batch.email_patterns.push(EmailPatternRecord::decided(
        Uuid::new_v4(),
        company.id,
        EmailPattern::InitialDashLast,
        "published addresses use an initial",
        PatternSource::Llm,
    ));
    batch
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count {table} failed: {e}"))
}

// ---------------------------------------------------------------------------
// Verification cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn verification_cache_honours_max_age(pool: PgPool) {
    let email = "taro.yamada@example.com";
    upsert_verification(&pool, &dns_result(email, true))
        .await
        .unwrap();

    backdate_verification(&pool, email, 89).await;
    let hit = find_recent_verification(&pool, email, 90).await.unwrap();
    assert_eq!(hit, Some(dns_result(email, true)));

    backdate_verification(&pool, email, 91).await;
    assert!(find_recent_verification(&pool, email, 90)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn future_dated_verification_is_ignored(pool: PgPool) {
    let email = "taro.yamada@example.com";
    upsert_verification(&pool, &dns_result(email, true))
        .await
        .unwrap();
    backdate_verification(&pool, email, -1).await;

    assert!(find_recent_verification(&pool, email, 90)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn reverification_replaces_the_cached_verdict(pool: PgPool) {
    let email = "taro.yamada@example.com";
    upsert_verification(&pool, &dns_result(email, true))
        .await
        .unwrap();
    upsert_verification(&pool, &dns_result(email, false))
        .await
        .unwrap();

    let cached = find_recent_verification(&pool, email, 90)
        .await
        .unwrap()
        .unwrap();
    assert!(!cached.has_mx_records);
    assert_eq!(count(&pool, "email_verifications").await, 1);
}

// ---------------------------------------------------------------------------
// Pattern ledger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ledger_counts_accumulate_and_keep_first_id(pool: PgPool) {
    let first = ledger_entry(2, 5, Some("taro.yamada@example.com"));
    upsert_learned_pattern(&pool, &first).await.unwrap();
    upsert_learned_pattern(&pool, &ledger_entry(1, 3, None))
        .await
        .unwrap();

    let stored = find_recent_learned_pattern(&pool, "example.com", 365)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.success_count, Some(3));
    assert_eq!(stored.total_count, Some(8));
    assert_eq!(stored.sample_email.as_deref(), Some("taro.yamada@example.com"));
    assert_eq!(list_domain_patterns(&pool, "example.com").await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stale_ledger_entry_is_not_returned(pool: PgPool) {
    upsert_learned_pattern(&pool, &ledger_entry(2, 5, None))
        .await
        .unwrap();
    sqlx::query("UPDATE email_patterns SET verified_at = NOW() - make_interval(days => 400)")
        .execute(&pool)
        .await
        .unwrap();

    assert!(find_recent_learned_pattern(&pool, "example.com", 365)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn newer_zero_success_entry_does_not_hide_learned_pattern(pool: PgPool) {
    upsert_learned_pattern(&pool, &ledger_entry(3, 4, None))
        .await
        .unwrap();
    sqlx::query("UPDATE email_patterns SET verified_at = NOW() - make_interval(days => 2)")
        .execute(&pool)
        .await
        .unwrap();
    let mut misses = ledger_entry(0, 5, None);
    misses.pattern = EmailPattern::InitialDashLast;
    upsert_learned_pattern(&pool, &misses).await.unwrap();

    let stored = find_recent_learned_pattern(&pool, "example.com", 365)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.pattern, EmailPattern::FirstDotLast);
    assert_eq!(stored.success_count, Some(3));
}

#[sqlx::test(migrations = "../../migrations")]
async fn ledger_entry_points_at_stored_company(pool: PgPool) {
    export_leads(&pool, &batch("Sales", &[found("taro", "yamada")]))
        .await
        .unwrap();
    let company = get_company_by_domain(&pool, "example.com")
        .await
        .unwrap()
        .unwrap();

    let entry = ledger_entry(1, 1, Some("t-yamada@example.com"));
    assert_ne!(entry.company_id, company.id);
    upsert_learned_pattern(&pool, &entry).await.unwrap();

    let stored = find_recent_learned_pattern(&pool, "example.com", 365)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.company_id, company.id);
}

// ---------------------------------------------------------------------------
// Raw snapshots and contact search cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn company_scan_upsert_is_last_write_wins(pool: PgPool) {
    let mut raw = CompanyScanRawData {
        company_id: Uuid::new_v4(),
        company: CompanyInput {
            name: "Example KK".to_string(),
            domain: "example.com".to_string(),
        },
        department: "Sales".to_string(),
        pattern_decision: PatternDecision {
            pattern: EmailPattern::InitialDashLast,
            records: Vec::new(),
            log_messages: vec!["Using default email pattern: f-last".to_string()],
        },
        contacts: vec![found("taro", "yamada")],
        collected_at: Utc::now(),
    };
    save_company_scan(&pool, &raw).await.unwrap();

    raw.contacts.push(found("hanako", "sato"));
    save_company_scan(&pool, &raw).await.unwrap();

    let loaded = load_company_scan(&pool, "example.com", "Sales")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.contacts.len(), 2);
    assert_eq!(count(&pool, "company_scans").await, 1);
    assert!(load_company_scan(&pool, "example.com", "HR")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn contact_search_cache_round_trips(pool: PgPool) {
    let contacts = vec![found("taro", "yamada")];
    save_contact_search(&pool, "example.com", "Sales", &contacts)
        .await
        .unwrap();

    let cached = find_recent_contact_search(&pool, "example.com", "Sales", 30)
        .await
        .unwrap();
    assert_eq!(cached, Some(contacts));
    assert!(find_recent_contact_search(&pool, "example.com", "HR", 30)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Lead export and report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn exporting_a_rescored_batch_replaces_contacts(pool: PgPool) {
    let contacts = [found("taro", "yamada"), found("hanako", "sato")];
    export_leads(&pool, &batch("Sales", &contacts)).await.unwrap();
    export_leads(&pool, &batch("Sales", &contacts)).await.unwrap();

    assert_eq!(count(&pool, "companies").await, 1);
    assert_eq!(count(&pool, "contacts").await, 2);
    assert_eq!(count(&pool, "email_candidates").await, 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn exporting_another_department_keeps_existing_contacts(pool: PgPool) {
    export_leads(&pool, &batch("Sales", &[found("taro", "yamada")]))
        .await
        .unwrap();
    export_leads(&pool, &batch("HR", &[found("hanako", "sato")]))
        .await
        .unwrap();

    assert_eq!(count(&pool, "companies").await, 1);
    assert_eq!(count(&pool, "contacts").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn report_filters_candidates_by_confidence(pool: PgPool) {
    export_leads(&pool, &batch("Sales", &[found("taro", "yamada")]))
        .await
        .unwrap();

    let company = get_company_by_domain(&pool, "example.com")
        .await
        .unwrap()
        .unwrap();
    let rows = list_candidates_for_company(&pool, company.id, 0.9)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email.as_deref(), Some("t-yamada@example.com"));
    assert_eq!(rows[0].is_primary, Some(true));

    let all = list_candidates_for_company(&pool, company.id, 0.0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
