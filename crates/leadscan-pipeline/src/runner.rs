//! Bounded-concurrency batch runner over many scan targets.
//!
//! Workers pop from one shared queue until it is empty. A failed target is
//! logged with its company context and does not stop the other workers.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;

use leadscan_core::ScanTarget;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::orchestrator::{ScanOrchestrator, ScanPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExists {
    /// Reuse an existing collect snapshot instead of collecting again.
    #[default]
    Skip,
    Overwrite,
}

impl FromStr for OnExists {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(OnExists::Skip),
            "overwrite" => Ok(OnExists::Overwrite),
            other => Err(format!(
                "unknown on-exists policy '{other}'; expected skip or overwrite"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub phase: ScanPhase,
    pub concurrency: usize,
    pub on_exists: OnExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTarget {
    pub target: ScanTarget,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<FailedTarget>,
}

impl BatchSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed.len()
    }

    fn merge(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
    }
}

/// Shared queue of pending targets.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Mutex<VecDeque<ScanTarget>>,
}

impl WorkQueue {
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = ScanTarget>) -> Self {
        Self {
            pending: Mutex::new(targets.into_iter().collect()),
        }
    }

    pub async fn pop(&self) -> Option<ScanTarget> {
        self.pending.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}

enum TargetOutcome {
    Done,
    Skipped,
}

/// Process every target with at most `options.concurrency` in flight.
pub async fn run_batch(
    orchestrator: Arc<ScanOrchestrator>,
    targets: Vec<ScanTarget>,
    options: BatchOptions,
) -> BatchSummary {
    let workers = options.concurrency.max(1).min(targets.len());
    let queue = Arc::new(WorkQueue::new(targets));

    let mut set = JoinSet::new();
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let orchestrator = Arc::clone(&orchestrator);
        set.spawn(async move { run_worker(worker_id, &queue, &orchestrator, options).await });
    }

    let mut summary = BatchSummary::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(worker_summary) => summary.merge(worker_summary),
            Err(e) => tracing::error!(error = %e, "scan worker panicked or was cancelled"),
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        phase = %options.phase,
        "batch complete"
    );
    summary
}

async fn run_worker(
    worker_id: usize,
    queue: &WorkQueue,
    orchestrator: &ScanOrchestrator,
    options: BatchOptions,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    while let Some(target) = queue.pop().await {
        tracing::debug!(
            worker_id,
            company = %target.company.name,
            domain = %target.company.domain,
            department = %target.department,
            "picked up scan target"
        );

        match process_target(orchestrator, &target, options).await {
            Ok(TargetOutcome::Done) => summary.succeeded += 1,
            Ok(TargetOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                tracing::error!(
                    company = %target.company.name,
                    domain = %target.company.domain,
                    department = %target.department,
                    error = %e,
                    "scan failed"
                );
                summary.failed.push(FailedTarget {
                    target,
                    error: e.to_string(),
                });
            }
        }
    }

    summary
}

async fn process_target(
    orchestrator: &ScanOrchestrator,
    target: &ScanTarget,
    options: BatchOptions,
) -> Result<TargetOutcome, crate::ScanError> {
    let reuse_snapshot = options.phase.includes_collect()
        && options.on_exists == OnExists::Skip
        && orchestrator.has_snapshot(target).await?;

    if !reuse_snapshot {
        orchestrator.run(target, options.phase).await?;
        return Ok(TargetOutcome::Done);
    }

    tracing::info!(
        company = %target.company.name,
        domain = %target.company.domain,
        department = %target.department,
        "snapshot exists; skipping collect"
    );

    if options.phase.includes_score() {
        orchestrator.run(target, ScanPhase::Score).await?;
        Ok(TargetOutcome::Done)
    } else {
        Ok(TargetOutcome::Skipped)
    }
}
