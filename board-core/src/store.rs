//! Storage seams for the ledger and the claim history.
//!
//! Implementations must keep one invariant: for every user,
//! `archived_totals(id).points + sum(points_awarded of live records) == total_points`.

use async_trait::async_trait;
use board_types::{ArchivedTotals, ClaimRecord, User, UserId};

use crate::BoardResult;

/// Users and their cumulative point totals.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fails with `Validation` when the trimmed name is empty or too long.
    async fn create_user(&self, name: &str) -> BoardResult<User>;

    async fn get_user(&self, id: UserId) -> BoardResult<User>;

    async fn find_by_name(&self, name: &str) -> BoardResult<Option<User>>;

    /// All users in creation order.
    async fn list_users(&self) -> BoardResult<Vec<User>>;

    /// Atomically increments `total_points` and returns the updated user.
    /// Concurrent calls against the same user never lose an update.
    async fn add_points(&self, id: UserId, delta: i64) -> BoardResult<User>;
}

/// Append-only log of claim events.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fails with `NotFound` when `record.user_id` does not resolve.
    async fn append(&self, record: ClaimRecord) -> BoardResult<ClaimRecord>;

    /// Newest first by timestamp, later insertions first on equal timestamps.
    async fn list_recent(&self, limit: u64) -> BoardResult<Vec<ClaimRecord>>;

    /// Keeps the newest `retain` records and folds the rest into per-user
    /// archive totals. Returns how many records were folded.
    async fn compact(&self, retain: u64) -> BoardResult<u64>;

    async fn archived_totals(&self, user_id: UserId) -> BoardResult<ArchivedTotals>;
}

#[async_trait]
pub trait BoardStore: LedgerStore + HistoryStore {
    /// Increments the user's total and appends the matching history record as
    /// one unit: either both are visible afterwards or neither is.
    async fn record_claim(&self, user_id: UserId, points: i32) -> BoardResult<(User, ClaimRecord)>;
}
