use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use board_types::{ClaimResult, UserId};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::{BoardError, BoardResult, BoardStore};

/// Smallest award a claim can produce.
pub const MIN_AWARD: i32 = 1;
/// Largest award a claim can produce.
pub const MAX_AWARD: i32 = 10;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Draws random awards and commits them to the store.
///
/// The generator is injected so tests can seed it; production uses an
/// OS-seeded [`StdRng`].
pub struct ClaimEngine {
    store: Arc<dyn BoardStore>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    max_retries: u32,
}

impl ClaimEngine {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    pub fn with_seed(store: Arc<dyn BoardStore>, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(store: Arc<dyn BoardStore>, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            store,
            rng: Mutex::new(Box::new(rng)),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Uniform draw from `MIN_AWARD..=MAX_AWARD`.
    pub fn draw_award(&self) -> i32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(MIN_AWARD..=MAX_AWARD)
    }

    /// Award a random number of points to `user_id`.
    ///
    /// Unknown users fail before anything is drawn or written. Store conflicts
    /// are retried with the same award, since a conflicting attempt commits
    /// nothing; once the retry budget is spent the conflict is returned.
    pub async fn claim(&self, user_id: UserId) -> BoardResult<ClaimResult> {
        let user = self.store.get_user(user_id).await?;
        let award = self.draw_award();

        let mut attempt = 0;
        loop {
            match self.store.record_claim(user.id, award).await {
                Ok((user, record)) => {
                    debug!(
                        "Claim {} awarded {} points to {} (total {})",
                        record.id, award, user.id, user.total_points
                    );
                    return Ok(ClaimResult::new(user, record));
                }
                Err(BoardError::Conflict(reason)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Claim for {} conflicted (attempt {}/{}): {}",
                        user_id, attempt, self.max_retries, reason
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
