// Failed block dump entry point; writes output/failed_heights.json.
//
// Configured entirely via DB_* environment variables; see config.rs.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use indexer_audit::config::DbConfig;
use indexer_audit::db::IndexerDb;
use indexer_audit::failed_blocks;
use indexer_audit::report::{ReportWriter, DEFAULT_OUTPUT_DIR};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("🔍 indexer-audit — failed block dump");

    let cfg = DbConfig::from_env()?;
    let report = ReportWriter::new(DEFAULT_OUTPUT_DIR)?;
    let db = IndexerDb::connect(&cfg).await?;

    // Query failures end the job, not the process; whatever was already
    // written stays on disk and the session is released by drop.
    if let Err(err) = failed_blocks::dump(&db, &report).await {
        tracing::error!("failed block dump aborted: {:?}", err);
    }

    Ok(())
}
