mod csv_export;
mod scan;
mod show;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scan::ScanArgs;

#[derive(Debug, Parser)]
#[command(name = "leadscan")]
#[command(about = "Find contacts at target companies and score their likely email addresses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect contacts and score email candidates for a list of companies
    Scan(ScanArgs),
    /// Print the stored contacts, candidates and pattern ledger for a domain
    Show {
        /// Company domain (a URL is accepted and normalised)
        domain: String,
        /// Hide candidates below this confidence
        #[arg(long, default_value = "0.9")]
        min_confidence: f64,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("leadscan: no command given; run `leadscan --help` for usage");
        return Ok(());
    };

    let config = leadscan_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(env = %config.env, "configuration loaded");

    match command {
        Commands::Scan(args) => scan::run_scan(&config, &args).await,
        Commands::Show {
            domain,
            min_confidence,
        } => {
            let pool = connect(&config).await?;
            show::run_show(&pool, &domain, min_confidence).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    leadscan_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = leadscan_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub(crate) async fn connect(config: &leadscan_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = leadscan_db::connect_pool(
        &config.database_url,
        leadscan_db::PoolConfig::from_app_config(config),
    )
    .await
    .map_err(|e| anyhow::anyhow!("failed to connect to database: {e}"))?;
    Ok(pool)
}
