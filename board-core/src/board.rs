use std::sync::Arc;

use board_types::{ClaimRecord, ClaimResult, RankedUser, UserId};
use tracing::info;

use crate::{BoardError, BoardResult, BoardStore, ClaimEngine, RankingEngine};

pub const DEFAULT_HISTORY_LIMIT: u64 = 50;
pub const MAX_HISTORY_LIMIT: u64 = 200;

pub const SAMPLE_USERS: [&str; 10] = [
    "Rahul", "Kamal", "Sanak", "Priya", "Amit", "Neha", "Rohit", "Anita", "Vikram", "Pooja",
];

/// Entry point for every board operation the API exposes.
pub struct Board {
    store: Arc<dyn BoardStore>,
    claims: ClaimEngine,
    history_limit: u64,
}

impl Board {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        let claims = ClaimEngine::new(store.clone());
        Self::with_claim_engine(store, claims)
    }

    /// The engine must be built over the same store.
    pub fn with_claim_engine(store: Arc<dyn BoardStore>, claims: ClaimEngine) -> Self {
        Self {
            store,
            claims,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, history_limit: u64) -> Self {
        self.history_limit = history_limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }

    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    pub async fn ranked_users(&self) -> BoardResult<Vec<RankedUser>> {
        let users = self.store.list_users().await?;
        Ok(RankingEngine::rank(users))
    }

    /// Creates the user and returns it with its rank at creation time.
    pub async fn add_user(&self, name: &str) -> BoardResult<RankedUser> {
        let user = self.store.create_user(name).await?;
        info!("Created user {} ({})", user.name, user.id);

        let users = self.store.list_users().await?;
        RankingEngine::rank_of(users, user.id).ok_or_else(|| BoardError::user_not_found(user.id))
    }

    pub async fn claim(&self, user_id: UserId) -> BoardResult<ClaimResult> {
        self.claims.claim(user_id).await
    }

    /// Most recent claims, newest first. `limit` falls back to the configured
    /// default and is clamped to `1..=MAX_HISTORY_LIMIT`.
    pub async fn history(&self, limit: Option<u64>) -> BoardResult<Vec<ClaimRecord>> {
        let limit = limit
            .unwrap_or(self.history_limit)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.store.list_recent(limit).await
    }

    /// Adds each sample user that does not exist yet. Returns how many were created.
    pub async fn seed_sample_users(&self) -> BoardResult<usize> {
        let mut created = 0;
        for name in SAMPLE_USERS {
            if self.store.find_by_name(name).await?.is_none() {
                self.store.create_user(name).await?;
                created += 1;
            }
        }

        if created > 0 {
            info!("Seeded {} sample users", created);
        }
        Ok(created)
    }
}
