// Epoch reward validation entry point; writes the four reconciliation
// snapshots under output/.
//
// Configured entirely via DB_* environment variables; EPOCH_IDENTIFIER
// overrides the audited epoch schedule (default "day").

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use indexer_audit::config::DbConfig;
use indexer_audit::db::IndexerDb;
use indexer_audit::report::{ReportWriter, DEFAULT_OUTPUT_DIR};
use indexer_audit::rewards::{self, DAY_EPOCH_IDENTIFIER, ENV_EPOCH_IDENTIFIER};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("🔍 indexer-audit — epoch reward validation");

    let cfg = DbConfig::from_env()?;
    let identifier = std::env::var(ENV_EPOCH_IDENTIFIER)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DAY_EPOCH_IDENTIFIER.to_string());

    let report = ReportWriter::new(DEFAULT_OUTPUT_DIR)?;
    let db = IndexerDb::connect(&cfg).await?;

    // Query failures end the job, not the process; whatever was already
    // written stays on disk and the session is released by drop.
    if let Err(err) = rewards::validate(&db, &report, &identifier).await {
        tracing::error!("reward validation aborted: {:?}", err);
    }

    Ok(())
}
