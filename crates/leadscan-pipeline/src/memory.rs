//! Process-local stores for runs that must not touch the shared database.
//!
//! One [`MemoryStore`] backs the raw snapshot store, the verification cache
//! and the pattern ledger. Everything is dropped with the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadscan_core::{
    is_within_days, BoxError, CompanyScanRawData, CompanyScanRawStore, EmailPatternRecord,
    EmailPatternRepository, EmailVerificationRepository, EmailVerificationResult,
};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<(String, String), CompanyScanRawData>>,
    verifications: Mutex<HashMap<String, (EmailVerificationResult, DateTime<Utc>)>>,
    ledger: Mutex<Vec<EmailPatternRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyScanRawStore for MemoryStore {
    async fn save(&self, raw: &CompanyScanRawData) -> Result<(), BoxError> {
        self.snapshots.lock().await.insert(
            (raw.company.domain.clone(), raw.department.clone()),
            raw.clone(),
        );
        Ok(())
    }

    async fn load(
        &self,
        domain: &str,
        department: &str,
    ) -> Result<Option<CompanyScanRawData>, BoxError> {
        Ok(self
            .snapshots
            .lock()
            .await
            .get(&(domain.to_string(), department.to_string()))
            .cloned())
    }
}

#[async_trait]
impl EmailVerificationRepository for MemoryStore {
    async fn find_recent(
        &self,
        email: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailVerificationResult>, BoxError> {
        let now = Utc::now();
        Ok(self
            .verifications
            .lock()
            .await
            .get(email)
            .filter(|(_, saved_at)| is_within_days(*saved_at, now, max_age_days))
            .map(|(result, _)| result.clone()))
    }

    async fn save(&self, result: &EmailVerificationResult) -> Result<(), BoxError> {
        self.verifications
            .lock()
            .await
            .insert(result.email.clone(), (result.clone(), Utc::now()));
        Ok(())
    }
}

#[async_trait]
impl EmailPatternRepository for MemoryStore {
    async fn find_recent_by_domain(
        &self,
        domain: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailPatternRecord>, BoxError> {
        let now = Utc::now();
        Ok(self
            .ledger
            .lock()
            .await
            .iter()
            .filter(|r| r.domain.as_deref() == Some(domain))
            .filter(|r| r.success_count.unwrap_or(0) > 0)
            .filter(|r| r.verified_at.is_some_and(|v| is_within_days(v, now, max_age_days)))
            .max_by_key(|r| r.verified_at)
            .cloned())
    }

    async fn save(&self, record: &EmailPatternRecord) -> Result<(), BoxError> {
        let mut ledger = self.ledger.lock().await;
        let existing = ledger.iter_mut().find(|r| {
            record.domain.is_some() && r.domain == record.domain && r.pattern == record.pattern
        });
        match existing {
            Some(existing) => {
                existing.success_count = Some(
                    existing.success_count.unwrap_or(0) + record.success_count.unwrap_or(0),
                );
                existing.total_count =
                    Some(existing.total_count.unwrap_or(0) + record.total_count.unwrap_or(0));
                if record.sample_email.is_some() {
                    existing.sample_email.clone_from(&record.sample_email);
                }
                existing.verified_at = record.verified_at.or(existing.verified_at);
            }
            None => ledger.push(record.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use leadscan_core::{EmailPattern, PatternSource};
    use uuid::Uuid;

    use super::*;

    fn entry(pattern: EmailPattern, success: i64, total: i64) -> EmailPatternRecord {
        EmailPatternRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            pattern,
            reason: format!("learned from mailbox verification of {pattern} addresses"),
            domain: Some("example.com".to_string()),
            source: Some(PatternSource::EmailHippo),
            sample_email: None,
            verified_at: Some(Utc::now()),
            success_count: Some(success),
            total_count: Some(total),
        }
    }

    #[tokio::test]
    async fn ledger_adds_counts_for_the_same_pattern() {
        let store = MemoryStore::new();
        EmailPatternRepository::save(&store, &entry(EmailPattern::FirstDotLast, 1, 2))
            .await
            .unwrap();
        EmailPatternRepository::save(&store, &entry(EmailPattern::FirstDotLast, 2, 3))
            .await
            .unwrap();

        let stored = store
            .find_recent_by_domain("example.com", 365)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.success_count, Some(3));
        assert_eq!(stored.total_count, Some(5));
    }

    #[tokio::test]
    async fn ledger_ignores_entries_without_successes() {
        let store = MemoryStore::new();
        EmailPatternRepository::save(&store, &entry(EmailPattern::LastFirst, 0, 4))
            .await
            .unwrap();
        assert!(store
            .find_recent_by_domain("example.com", 365)
            .await
            .unwrap()
            .is_none());
    }
}
