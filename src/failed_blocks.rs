//! Failed block dump: snapshot the heights the indexer could not process.

use anyhow::Result;

use crate::db::IndexerDb;
use crate::report::ReportWriter;

pub const FAILED_HEIGHTS_FILE: &str = "failed_heights.json";

/// Fetch every failed block height (ascending) and write the list.
pub async fn dump(db: &IndexerDb, report: &ReportWriter) -> Result<()> {
    let heights = db.failed_heights().await?;
    tracing::info!("{} failed block heights recorded", heights.len());

    report.write(FAILED_HEIGHTS_FILE, &heights)?;
    Ok(())
}
