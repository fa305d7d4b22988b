//! Inputs to a scan and the durable snapshot written by the collect phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pattern::EmailPattern;
use crate::records::EmailPatternRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    pub domain: String,
}

/// One unit of work for the batch runner, keyed by `(domain, department)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub company: CompanyInput,
    pub department: String,
}

impl ScanTarget {
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.company.domain
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
}

/// A contact as returned by the discovery collaborator, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundContact {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub sources: Vec<ContactSource>,
}

/// Result of the pattern decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDecision {
    pub pattern: EmailPattern,
    /// Zero or one record; empty when the default pattern was used.
    pub records: Vec<EmailPatternRecord>,
    /// Human-readable audit trail, not control data.
    pub log_messages: Vec<String>,
}

/// Durable output of the collect phase, consumed by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScanRawData {
    pub company_id: Uuid,
    pub company: CompanyInput,
    pub department: String,
    pub pattern_decision: PatternDecision,
    pub contacts: Vec<FoundContact>,
    pub collected_at: DateTime<Utc>,
}
