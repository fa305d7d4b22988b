//! The scan pipeline: pattern decision, candidate generation, verification,
//! scoring, pattern learning, and the collect/score state machine that ties
//! them together.

pub mod candidates;
pub mod contact_cache;
pub mod decision;
pub mod entities;
pub mod error;
pub mod learning;
pub mod memory;
pub mod orchestrator;
pub mod runner;
pub mod scoring;
pub mod verification;

pub use candidates::{
    create_contact_and_email_candidates, generate_email_addresses, CandidateRequest,
    ContactCandidates, EmailAddress, EmailCandidates, ALTERNATIVE_BASE_CONFIDENCE,
    PRIMARY_BASE_CONFIDENCE,
};
pub use contact_cache::CachedContactFinder;
pub use decision::decide_email_pattern;
pub use entities::build_lead_batch;
pub use error::ScanError;
pub use learning::{build_learning_record, learned_pattern_from_record, summarize_pattern_outcome};
pub use memory::MemoryStore;
pub use orchestrator::{
    PhaseOutcome, ScanDependencies, ScanOrchestrator, ScanPhase, ScanSettings, ScoreOutcome,
    ScoreSummary,
};
pub use runner::{run_batch, BatchOptions, BatchSummary, FailedTarget, OnExists, WorkQueue};
pub use scoring::adjust_email_confidence;
pub use verification::{VerificationCoordinator, VerificationReport};
