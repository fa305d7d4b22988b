//! `leadscan scan`: wires the collaborators from config and flags, then runs
//! the batch.
//!
//! Every credential and file check happens before the database is touched,
//! so a misconfigured run fails without side effects. Debug runs never touch
//! it at all: snapshots, verdicts and the ledger stay in process and leads go
//! to CSV.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use leadscan_core::{
    load_scan_targets, AppConfig, ContactFinder, EmailPatternDetector, EmailVerifier,
    LeadExporter, UuidGenerator,
};
use leadscan_db::PgStore;
use leadscan_llm::{
    DebugContactFinder, DebugPatternDetector, LlmContactFinder, LlmEmailPatternDetector,
    OpenAiClient,
};
use leadscan_pipeline::{
    run_batch, BatchOptions, BatchSummary, CachedContactFinder, MemoryStore, OnExists,
    ScanDependencies, ScanOrchestrator, ScanPhase, ScanSettings,
};
use leadscan_verify::{DnsMxVerifier, EmailHippoClient, EmailHippoCsvVerifier};

use crate::csv_export::CsvLeadExporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerifierKind {
    /// EmailHippo mailbox verification API
    Hippo,
    /// MX-record presence only
    Dns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Db,
    Csv,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Company list: CSV with name,domain,department columns, or YAML
    pub companies: PathBuf,

    /// Which half of the pipeline to run: collect, score, or all
    #[arg(long, default_value = "all")]
    pub phase: ScanPhase,

    /// Companies processed in parallel (defaults to LEADSCAN_SCAN_CONCURRENCY)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// What to do when a collect snapshot already exists: skip or overwrite
    #[arg(long, default_value = "skip")]
    pub on_exists: OnExists,

    #[arg(long, value_enum, default_value_t = VerifierKind::Hippo)]
    pub verifier: VerifierKind,

    /// Serve verdicts from an EmailHippo bulk export instead of a live verifier
    #[arg(long)]
    pub email_verifications_csv: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportTarget::Db)]
    pub export: ExportTarget,

    /// Root directory for `--export csv`
    #[arg(long, default_value = "./output")]
    pub export_dir: PathBuf,

    /// Canned contacts and no pattern detection; no API keys needed. Nothing
    /// is written to the database and leads are exported as CSV.
    #[arg(long)]
    pub debug: bool,
}

/// The verifier a scan will use, before any client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VerifierPlan {
    Csv(PathBuf),
    Dns,
    Hippo,
}

/// A bulk export always wins. Debug runs never call the paid API.
pub(crate) fn plan_verifier(
    kind: VerifierKind,
    csv: Option<&Path>,
    debug: bool,
) -> VerifierPlan {
    match (csv, kind) {
        (Some(path), _) => VerifierPlan::Csv(path.to_path_buf()),
        (None, VerifierKind::Dns) => VerifierPlan::Dns,
        (None, VerifierKind::Hippo) if debug => VerifierPlan::Dns,
        (None, VerifierKind::Hippo) => VerifierPlan::Hippo,
    }
}

/// Run a scan over every company in `args.companies`.
///
/// # Errors
///
/// Returns an error if the company list is invalid, a required API key is
/// missing, a client cannot be built, the database is unreachable, or every
/// scan in the batch failed. Individual company failures are reported and
/// do not abort the run.
pub(crate) async fn run_scan(config: &AppConfig, args: &ScanArgs) -> anyhow::Result<()> {
    let targets = load_scan_targets(&args.companies)?;
    if targets.is_empty() {
        println!("no companies to scan in {}", args.companies.display());
        return Ok(());
    }

    let (finder, detector) = build_search_collaborators(config, args.debug)?;
    let verifier = build_verifier(
        config,
        plan_verifier(args.verifier, args.email_verifications_csv.as_deref(), args.debug),
    )?;

    let deps = if args.debug {
        if args.export == ExportTarget::Db {
            tracing::warn!(
                export_dir = %args.export_dir.display(),
                "debug run never writes to the database; exporting CSV instead"
            );
        }
        debug_dependencies(finder, detector, verifier, &args.export_dir)
    } else {
        let pool = crate::connect(config).await?;
        let store = Arc::new(PgStore::new(pool));
        let lead_exporter: Arc<dyn LeadExporter> = match args.export {
            ExportTarget::Db => store.clone(),
            ExportTarget::Csv => Arc::new(CsvLeadExporter::new(&args.export_dir)),
        };
        ScanDependencies {
            contact_finder: Arc::new(CachedContactFinder::new(
                finder,
                store.clone(),
                config.contact_cache_max_age_days,
            )),
            pattern_detector: detector,
            email_verifier: verifier,
            verification_repository: store.clone(),
            pattern_repository: store.clone(),
            raw_store: store,
            lead_exporter,
            id_generator: Arc::new(UuidGenerator),
        }
    };
    let settings = ScanSettings {
        pattern_max_age_days: config.pattern_max_age_days,
        verify_concurrency: config.verify_concurrency,
        call_timeout: Duration::from_secs(config.call_timeout_secs),
    };
    let orchestrator = Arc::new(ScanOrchestrator::new(deps, settings));

    let options = BatchOptions {
        phase: args.phase,
        concurrency: args.concurrency.unwrap_or(config.scan_concurrency),
        on_exists: args.on_exists,
    };
    let total = targets.len();
    tracing::info!(
        companies = total,
        phase = %options.phase,
        concurrency = options.concurrency,
        debug = args.debug,
        "starting scan"
    );

    let summary = run_batch(orchestrator, targets, options).await;
    print_summary(&summary);

    if summary.failed.len() == total {
        anyhow::bail!("all {total} scan(s) failed");
    }
    Ok(())
}

/// Collaborators for `--debug`: one in-process store, no contact-search
/// cache, and CSV export under `export_dir`.
pub(crate) fn debug_dependencies(
    finder: Arc<dyn ContactFinder>,
    detector: Arc<dyn EmailPatternDetector>,
    verifier: Arc<dyn EmailVerifier>,
    export_dir: &Path,
) -> ScanDependencies {
    let store = Arc::new(MemoryStore::new());
    ScanDependencies {
        contact_finder: finder,
        pattern_detector: detector,
        email_verifier: verifier,
        verification_repository: store.clone(),
        pattern_repository: store.clone(),
        raw_store: store,
        lead_exporter: Arc::new(CsvLeadExporter::new(export_dir)),
        id_generator: Arc::new(UuidGenerator),
    }
}

type SearchCollaborators = (Arc<dyn ContactFinder>, Arc<dyn EmailPatternDetector>);

fn build_search_collaborators(
    config: &AppConfig,
    debug: bool,
) -> anyhow::Result<SearchCollaborators> {
    if debug {
        return Ok((Arc::new(DebugContactFinder), Arc::new(DebugPatternDetector)));
    }

    let api_key = config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set; cannot run scan (use --debug for a dry run)"))?;
    let client = OpenAiClient::with_base_url(
        api_key,
        &config.openai_model,
        config.llm_timeout_secs,
        &config.openai_base_url,
    )
    .context("failed to build OpenAI client")?
    .with_retry_policy(config.llm_max_retries, config.llm_retry_backoff_base_ms);

    Ok((
        Arc::new(LlmContactFinder::new(client.clone())),
        Arc::new(LlmEmailPatternDetector::new(client)),
    ))
}

fn build_verifier(config: &AppConfig, plan: VerifierPlan) -> anyhow::Result<Arc<dyn EmailVerifier>> {
    let verifier: Arc<dyn EmailVerifier> = match plan {
        VerifierPlan::Csv(path) => Arc::new(
            EmailHippoCsvVerifier::from_path(&path)?
                .with_cache_max_age_days(config.hippo_cache_max_age_days),
        ),
        VerifierPlan::Dns => Arc::new(
            DnsMxVerifier::new(config.verifier_timeout_secs)
                .with_cache_max_age_days(config.dns_cache_max_age_days),
        ),
        VerifierPlan::Hippo => {
            let api_key = config.email_hippo_api_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "EMAIL_HIPPO_API_KEY is not set; required by --verifier hippo \
                     (use --verifier dns or --email-verifications-csv)"
                )
            })?;
            Arc::new(
                EmailHippoClient::with_base_url(
                    api_key,
                    config.verifier_timeout_secs,
                    &config.email_hippo_base_url,
                )
                .context("failed to build EmailHippo client")?
                .with_cache_max_age_days(config.hippo_cache_max_age_days),
            )
        }
    };
    Ok(verifier)
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "scan finished: {} succeeded, {} skipped, {} failed",
        summary.succeeded,
        summary.skipped,
        summary.failed.len()
    );
    for failure in &summary.failed {
        println!(
            "  FAILED {} ({}) [{}]: {}",
            failure.target.company.name,
            failure.target.domain(),
            failure.target.department,
            failure.error
        );
    }
}
