use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{BoardError, BoardResult, DEFAULT_MAX_RETRIES, HistoryStore};

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Bounds the live claim history to the newest `retain` records.
///
/// Folded records move into per-user archive totals, so ledger totals still
/// reconcile with what the history store holds.
#[derive(Debug, Clone, Copy)]
pub struct HistoryCompactor {
    pub retain: u64,
    pub max_retries: u32,
}

impl HistoryCompactor {
    pub fn new(retain: u64) -> Self {
        Self {
            retain,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// A compaction pass that loses a write race to claims commits nothing,
    /// so conflicts are retried up to `max_retries` times.
    pub async fn run<S>(&self, store: &S) -> BoardResult<u64>
    where
        S: HistoryStore + ?Sized,
    {
        let mut attempt = 0;
        let folded = loop {
            match store.compact(self.retain).await {
                Ok(folded) => break folded,
                Err(BoardError::Conflict(reason)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "History compaction conflicted (attempt {}/{}): {}",
                        attempt, self.max_retries, reason
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => return Err(err),
            }
        };

        if folded > 0 {
            info!(
                "Compacted {} claim records into archives (retaining {})",
                folded, self.retain
            );
        } else {
            debug!("Claim history within retention of {}", self.retain);
        }

        Ok(folded)
    }
}
