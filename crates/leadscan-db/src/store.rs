//! Postgres-backed implementations of the pipeline's persistence ports.

use async_trait::async_trait;
use leadscan_core::{
    BoxError, CompanyScanRawData, CompanyScanRawStore, ContactSearchCache, EmailPatternRecord,
    EmailPatternRepository, EmailVerificationRepository, EmailVerificationResult, FoundContact,
    LeadBatch, LeadExporter,
};
use sqlx::PgPool;

use crate::{
    export_leads, find_recent_contact_search, find_recent_learned_pattern,
    find_recent_verification, load_company_scan, save_company_scan, save_contact_search,
    upsert_learned_pattern, upsert_verification,
};

/// One pool shared by every port. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EmailVerificationRepository for PgStore {
    async fn find_recent(
        &self,
        email: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailVerificationResult>, BoxError> {
        Ok(find_recent_verification(&self.pool, email, max_age_days).await?)
    }

    async fn save(&self, result: &EmailVerificationResult) -> Result<(), BoxError> {
        Ok(upsert_verification(&self.pool, result).await?)
    }
}

#[async_trait]
impl EmailPatternRepository for PgStore {
    async fn find_recent_by_domain(
        &self,
        domain: &str,
        max_age_days: u32,
    ) -> Result<Option<EmailPatternRecord>, BoxError> {
        Ok(find_recent_learned_pattern(&self.pool, domain, max_age_days).await?)
    }

    async fn save(&self, record: &EmailPatternRecord) -> Result<(), BoxError> {
        Ok(upsert_learned_pattern(&self.pool, record).await?)
    }
}

#[async_trait]
impl CompanyScanRawStore for PgStore {
    async fn save(&self, raw: &CompanyScanRawData) -> Result<(), BoxError> {
        Ok(save_company_scan(&self.pool, raw).await?)
    }

    async fn load(
        &self,
        domain: &str,
        department: &str,
    ) -> Result<Option<CompanyScanRawData>, BoxError> {
        Ok(load_company_scan(&self.pool, domain, department).await?)
    }
}

#[async_trait]
impl ContactSearchCache for PgStore {
    async fn find_recent(
        &self,
        domain: &str,
        department: &str,
        max_age_days: u32,
    ) -> Result<Option<Vec<FoundContact>>, BoxError> {
        Ok(find_recent_contact_search(&self.pool, domain, department, max_age_days).await?)
    }

    async fn save(
        &self,
        domain: &str,
        department: &str,
        contacts: &[FoundContact],
    ) -> Result<(), BoxError> {
        Ok(save_contact_search(&self.pool, domain, department, contacts).await?)
    }
}

#[async_trait]
impl LeadExporter for PgStore {
    async fn export(&self, _domain: &str, batch: &LeadBatch) -> Result<(), BoxError> {
        Ok(export_leads(&self.pool, batch).await?)
    }
}
