//! Offline stand-ins for `scan --debug`: no API keys, no network.

use async_trait::async_trait;
use leadscan_core::{
    BoxError, ContactFinder, DetectedPattern, EmailPatternDetector, FoundContact,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DebugContactFinder;

#[async_trait]
impl ContactFinder for DebugContactFinder {
    async fn search_contacts(
        &self,
        _company_name: &str,
        domain: &str,
        _department: &str,
    ) -> Result<Vec<FoundContact>, BoxError> {
        tracing::debug!(domain, "returning canned debug contacts");
        Ok(canned_contacts())
    }
}

/// Always reports that no convention was detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugPatternDetector;

#[async_trait]
impl EmailPatternDetector for DebugPatternDetector {
    async fn detect(&self, _domain: &str) -> Result<Option<DetectedPattern>, BoxError> {
        Ok(None)
    }
}

fn canned_contacts() -> Vec<FoundContact> {
    vec![
        FoundContact {
            name: "松尾 庄馬".to_string(),
            position: "取締役".to_string(),
            department: "経営本部".to_string(),
            first_name: "shoma".to_string(),
            last_name: "matsuo".to_string(),
            sources: Vec::new(),
        },
        FoundContact {
            name: "山崎 祐太".to_string(),
            position: "代表取締役".to_string(),
            department: "経営本部".to_string(),
            first_name: "yuta".to_string(),
            last_name: "yamazaki".to_string(),
            sources: Vec::new(),
        },
    ]
}
