use std::future::Future;
use std::time::Duration;

use leadscan_core::{BoxError, ValidationError};
use thiserror::Error;

/// Failure of a single `(domain, department)` scan, tagged by the phase
/// that produced it.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("contact search failed for {domain}: {source}")]
    ContactSearch {
        domain: String,
        #[source]
        source: BoxError,
    },

    #[error("email pattern detection failed for {domain}: {source}")]
    PatternDetection {
        domain: String,
        #[source]
        source: BoxError,
    },

    #[error("verification failed for {email}: {source}")]
    Verification {
        email: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation} failed: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("lead export failed for {domain}: {source}")]
    Export {
        domain: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),
}

/// Await `fut`, turning expiry of `limit` into [`ScanError::Timeout`].
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, ScanError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ScanError::Timeout {
            operation,
            secs: limit.as_secs(),
        })
}
