//! Read-only diagnostics for a cosmos-indexer PostgreSQL database.
//!
//! Two jobs share this library: `dump-failed-blocks` snapshots the block
//! heights the indexer failed to process, and `rewards-validation`
//! reconciles daily epoch boundaries against indexed blocks and
//! reward-event counts. Both write their results as JSON under `./output/`.

pub mod config;
pub mod db;
pub mod failed_blocks;
pub mod report;
pub mod rewards;
