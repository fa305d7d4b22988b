use std::sync::Arc;

use async_trait::async_trait;
use leadscan_core::{BoxError, ContactFinder, ContactSearchCache, FoundContact};

/// Serves recent contact searches for the same `(domain, department)` from a
/// cache before falling through to the wrapped finder.
///
/// Cache failures are logged and never fail the search.
pub struct CachedContactFinder {
    inner: Arc<dyn ContactFinder>,
    cache: Arc<dyn ContactSearchCache>,
    max_age_days: u32,
}

impl CachedContactFinder {
    #[must_use]
    pub fn new(
        inner: Arc<dyn ContactFinder>,
        cache: Arc<dyn ContactSearchCache>,
        max_age_days: u32,
    ) -> Self {
        Self {
            inner,
            cache,
            max_age_days,
        }
    }
}

#[async_trait]
impl ContactFinder for CachedContactFinder {
    async fn search_contacts(
        &self,
        company_name: &str,
        domain: &str,
        department: &str,
    ) -> Result<Vec<FoundContact>, BoxError> {
        match self
            .cache
            .find_recent(domain, department, self.max_age_days)
            .await
        {
            Ok(Some(contacts)) => {
                tracing::info!(domain, department, count = contacts.len(), "contact search cache hit");
                return Ok(contacts);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(domain, department, error = %e, "contact search cache read failed");
            }
        }

        let contacts = self
            .inner
            .search_contacts(company_name, domain, department)
            .await?;

        if !contacts.is_empty() {
            if let Err(e) = self.cache.save(domain, department, &contacts).await {
                tracing::warn!(domain, department, error = %e, "contact search cache write failed");
            }
        }

        Ok(contacts)
    }
}
