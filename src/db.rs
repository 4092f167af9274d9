//! Read-only access to the indexer's PostgreSQL schema.
//!
//! One session per job run. tokio-postgres splits client and connection;
//! the connection future is spawned onto the runtime and dropping
//! `IndexerDb` hangs up the session on every exit path.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, NoTls};

use crate::config::DbConfig;

pub const FAILED_HEIGHTS_QUERY: &str = "SELECT height FROM failed_blocks ORDER BY height ASC";
pub const EPOCHS_BY_IDENTIFIER_QUERY: &str =
    "SELECT epoch_number, start_height FROM epoches WHERE identifier = $1 ORDER BY start_height ASC";
pub const BLOCK_BY_HEIGHT_QUERY: &str = "SELECT id, height FROM blocks WHERE height = $1";
pub const REWARD_EVENT_COUNT_QUERY: &str =
    "SELECT COUNT(*) FROM taxable_event WHERE block_id = $1 AND source = $2";

/// `taxable_event.source` value tagging epoch-derived reward distributions.
pub const EPOCH_REWARD_SOURCE: i64 = 0;

/// One tracked epoch boundary (`epoches` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub epoch_number: i64,
    pub start_height: i64,
}

/// One indexed block (`blocks` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedBlock {
    pub id: i64,
    pub height: i64,
}

pub struct IndexerDb {
    client: Client,
}

impl IndexerDb {
    /// Open a session against the configured database.
    pub async fn connect(cfg: &DbConfig) -> Result<Self> {
        let (client, connection) = tokio_postgres::Config::new()
            .host(&cfg.host)
            .port(cfg.port)
            .user(&cfg.user)
            .password(&cfg.password)
            .dbname(&cfg.db_name)
            .connect(NoTls)
            .await
            .with_context(|| {
                format!(
                    "failed to connect to postgres at {}:{}/{}",
                    cfg.host, cfg.port, cfg.db_name
                )
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("postgres connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    /// All block heights that failed processing, ascending.
    pub async fn failed_heights(&self) -> Result<Vec<i64>> {
        let rows = self
            .client
            .query(FAILED_HEIGHTS_QUERY, &[])
            .await
            .context("failed_blocks query failed")?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// All tracked epochs for an identifier, ascending by start height.
    pub async fn epochs_by_identifier(&self, identifier: &str) -> Result<Vec<Epoch>> {
        let rows = self
            .client
            .query(EPOCHS_BY_IDENTIFIER_QUERY, &[&identifier])
            .await
            .with_context(|| format!("epoches query failed for identifier '{}'", identifier))?;

        Ok(rows
            .iter()
            .map(|row| Epoch {
                epoch_number: row.get(0),
                start_height: row.get(1),
            })
            .collect())
    }

    /// The indexed block at a height, if one exists. Takes the first row
    /// when several match.
    pub async fn block_at_height(&self, height: i64) -> Result<Option<TrackedBlock>> {
        let rows = self
            .client
            .query(BLOCK_BY_HEIGHT_QUERY, &[&height])
            .await
            .with_context(|| format!("block lookup at height {} failed", height))?;

        Ok(rows.first().map(|row| TrackedBlock {
            id: row.get(0),
            height: row.get(1),
        }))
    }

    /// Count of epoch-reward taxable events attributed to a block. The
    /// aggregate always yields one row, 0 when nothing matches.
    pub async fn reward_event_count(&self, block_id: i64) -> Result<i64> {
        let row = self
            .client
            .query_one(REWARD_EVENT_COUNT_QUERY, &[&block_id, &EPOCH_REWARD_SOURCE])
            .await
            .with_context(|| format!("reward event count for block {} failed", block_id))?;

        Ok(row.get(0))
    }
}
