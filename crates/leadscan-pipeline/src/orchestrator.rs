//! The collect → score state machine for one `(domain, department)` key.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leadscan_core::{
    CompanyScanRawData, CompanyScanRawStore, ContactFinder, EmailPatternDetector,
    EmailPatternRepository, EmailVerificationRepository, EmailVerifier, FoundContact, IdGenerator,
    LeadExporter, ScanTarget,
};

use crate::candidates::create_contact_and_email_candidates;
use crate::decision::decide_email_pattern;
use crate::entities::build_lead_batch;
use crate::error::{bounded, ScanError};
use crate::learning::{build_learning_record, learned_pattern_from_record, summarize_pattern_outcome};
use crate::verification::VerificationCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Collect,
    Score,
    All,
}

impl ScanPhase {
    #[must_use]
    pub fn includes_collect(self) -> bool {
        matches!(self, ScanPhase::Collect | ScanPhase::All)
    }

    #[must_use]
    pub fn includes_score(self) -> bool {
        matches!(self, ScanPhase::Score | ScanPhase::All)
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Collect => write!(f, "collect"),
            ScanPhase::Score => write!(f, "score"),
            ScanPhase::All => write!(f, "all"),
        }
    }
}

impl FromStr for ScanPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect" => Ok(ScanPhase::Collect),
            "score" => Ok(ScanPhase::Score),
            "all" => Ok(ScanPhase::All),
            other => Err(format!(
                "unknown phase '{other}'; expected collect, score, or all"
            )),
        }
    }
}

/// Collaborators used by the orchestrator. Shared across batch workers.
#[derive(Clone)]
pub struct ScanDependencies {
    pub contact_finder: Arc<dyn ContactFinder>,
    pub pattern_detector: Arc<dyn EmailPatternDetector>,
    pub email_verifier: Arc<dyn EmailVerifier>,
    pub verification_repository: Arc<dyn EmailVerificationRepository>,
    pub pattern_repository: Arc<dyn EmailPatternRepository>,
    pub raw_store: Arc<dyn CompanyScanRawStore>,
    pub lead_exporter: Arc<dyn LeadExporter>,
    pub id_generator: Arc<dyn IdGenerator>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub pattern_max_age_days: u32,
    pub verify_concurrency: usize,
    pub call_timeout: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            pattern_max_age_days: 365,
            verify_concurrency: 8,
            call_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub contacts: usize,
    pub candidates: usize,
    pub deliverable: usize,
    pub escalated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Nothing was collected for the key yet.
    NoSnapshot,
    Exported(ScoreSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutcome {
    Collected { contacts: usize },
    Scored(ScoreOutcome),
    CollectedAndScored {
        contacts: usize,
        score: ScoreOutcome,
    },
}

pub struct ScanOrchestrator {
    deps: ScanDependencies,
    settings: ScanSettings,
}

impl ScanOrchestrator {
    #[must_use]
    pub fn new(deps: ScanDependencies, settings: ScanSettings) -> Self {
        Self { deps, settings }
    }

    /// Run `phase` for `target`.
    ///
    /// # Errors
    ///
    /// Returns the [`ScanError`] of whichever phase failed.
    pub async fn run(&self, target: &ScanTarget, phase: ScanPhase) -> Result<PhaseOutcome, ScanError> {
        match phase {
            ScanPhase::Collect => {
                let raw = self.collect(target).await?;
                Ok(PhaseOutcome::Collected {
                    contacts: raw.contacts.len(),
                })
            }
            ScanPhase::Score => {
                let outcome = self.score(target.domain(), &target.department).await?;
                Ok(PhaseOutcome::Scored(outcome))
            }
            ScanPhase::All => {
                let raw = self.collect(target).await?;
                let score = self.score(target.domain(), &target.department).await?;
                Ok(PhaseOutcome::CollectedAndScored {
                    contacts: raw.contacts.len(),
                    score,
                })
            }
        }
    }

    /// Whether a collect snapshot already exists for the target's key.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Persistence`] if the store cannot be read.
    pub async fn has_snapshot(&self, target: &ScanTarget) -> Result<bool, ScanError> {
        Ok(self
            .load_snapshot(target.domain(), &target.department)
            .await?
            .is_some())
    }

    /// Decide the pattern, discover contacts and persist the raw snapshot.
    /// The snapshot is written only after both external calls succeed.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] from the pattern store, detector, contact
    /// finder or raw store.
    pub async fn collect(&self, target: &ScanTarget) -> Result<CompanyScanRawData, ScanError> {
        let domain = target.domain();
        let department = target.department.as_str();
        let limit = self.settings.call_timeout;
        let company_id = self.deps.id_generator.generate();

        let stored = bounded(
            "learned pattern lookup",
            limit,
            self.deps
                .pattern_repository
                .find_recent_by_domain(domain, self.settings.pattern_max_age_days),
        )
        .await?
        .map_err(|source| ScanError::Persistence {
            operation: "learned pattern lookup",
            source,
        })?;
        let learned = stored.as_ref().and_then(learned_pattern_from_record);

        let detected = if learned.is_some() {
            None
        } else {
            bounded(
                "email pattern detection",
                limit,
                self.deps.pattern_detector.detect(domain),
            )
            .await?
            .map_err(|source| ScanError::PatternDetection {
                domain: domain.to_string(),
                source,
            })?
        };

        let decision = decide_email_pattern(
            company_id,
            detected.as_ref(),
            learned.as_ref(),
            self.deps.id_generator.as_ref(),
        );
        for message in &decision.log_messages {
            tracing::info!(domain, department, "{message}");
        }

        let found = bounded(
            "contact search",
            limit,
            self.deps
                .contact_finder
                .search_contacts(&target.company.name, domain, department),
        )
        .await?
        .map_err(|source| ScanError::ContactSearch {
            domain: domain.to_string(),
            source,
        })?;
        let contacts = drop_nameless(found, domain);

        let raw = CompanyScanRawData {
            company_id,
            company: target.company.clone(),
            department: department.to_string(),
            pattern_decision: decision,
            contacts,
            collected_at: Utc::now(),
        };

        bounded("raw scan save", limit, self.deps.raw_store.save(&raw))
            .await?
            .map_err(|source| ScanError::Persistence {
                operation: "raw scan save",
                source,
            })?;

        tracing::info!(
            domain,
            department,
            contacts = raw.contacts.len(),
            pattern = %raw.pattern_decision.pattern,
            "collect phase complete"
        );
        Ok(raw)
    }

    /// Generate, verify and export candidates from the stored snapshot.
    /// A missing snapshot is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] from the raw store, verification, record
    /// validation, exporter or pattern ledger.
    pub async fn score(&self, domain: &str, department: &str) -> Result<ScoreOutcome, ScanError> {
        let limit = self.settings.call_timeout;

        let Some(raw) = self.load_snapshot(domain, department).await? else {
            tracing::info!(
                domain,
                department,
                "no collected snapshot for this company and department; skipping score"
            );
            return Ok(ScoreOutcome::NoSnapshot);
        };

        let pattern = raw.pattern_decision.pattern;
        let contacts = create_contact_and_email_candidates(&raw.contacts, domain, pattern);

        let coordinator = VerificationCoordinator::new(
            self.deps.email_verifier.as_ref(),
            self.deps.verification_repository.as_ref(),
            self.settings.verify_concurrency,
            limit,
        );
        let report = coordinator.verify_candidates(&contacts).await?;
        tracing::info!(
            domain,
            department,
            cache_hits = report.cache_hits,
            fresh = report.fresh_verifications,
            escalated = report.escalated,
            "verification complete"
        );

        let batch = build_lead_batch(
            &raw,
            &contacts,
            &report.results,
            self.deps.id_generator.as_ref(),
        )?;

        bounded(
            "lead export",
            limit,
            self.deps.lead_exporter.export(domain, &batch),
        )
        .await?
        .map_err(|source| ScanError::Export {
            domain: domain.to_string(),
            source,
        })?;

        // After the export, so the ledger can resolve the stored company.
        let outcome = summarize_pattern_outcome(&batch.email_candidates, &report.results, pattern);
        match build_learning_record(
            self.deps.id_generator.generate(),
            raw.company_id,
            domain,
            pattern,
            &outcome,
            Utc::now(),
        )? {
            Some(record) => {
                bounded(
                    "pattern ledger save",
                    limit,
                    self.deps.pattern_repository.save(&record),
                )
                .await?
                .map_err(|source| ScanError::Persistence {
                    operation: "pattern ledger save",
                    source,
                })?;
            }
            None => tracing::debug!(
                domain,
                pattern = %pattern,
                "no mailbox-level verdicts for the decided pattern; ledger unchanged"
            ),
        }

        let summary = ScoreSummary {
            contacts: batch.contacts.len(),
            candidates: batch.email_candidates.len(),
            deliverable: batch
                .email_candidates
                .iter()
                .filter(|c| c.is_deliverable == Some(true))
                .count(),
            escalated: report.escalated,
        };
        tracing::info!(
            domain,
            department,
            contacts = summary.contacts,
            candidates = summary.candidates,
            deliverable = summary.deliverable,
            "score phase complete"
        );
        Ok(ScoreOutcome::Exported(summary))
    }

    async fn load_snapshot(
        &self,
        domain: &str,
        department: &str,
    ) -> Result<Option<CompanyScanRawData>, ScanError> {
        bounded(
            "raw scan load",
            self.settings.call_timeout,
            self.deps.raw_store.load(domain, department),
        )
        .await?
        .map_err(|source| ScanError::Persistence {
            operation: "raw scan load",
            source,
        })
    }
}

fn drop_nameless(found: Vec<FoundContact>, domain: &str) -> Vec<FoundContact> {
    let before = found.len();
    let kept: Vec<FoundContact> = found
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .collect();
    if kept.len() < before {
        tracing::warn!(
            domain,
            dropped = before - kept.len(),
            "discarding discovered contacts without a name"
        );
    }
    kept
}
