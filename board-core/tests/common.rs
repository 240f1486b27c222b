#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use board_core::{
    Board, BoardError, BoardResult, BoardStore, ClaimEngine, HistoryStore, LedgerStore,
    MemoryBoardStore,
};
use board_types::{ArchivedTotals, ClaimRecord, User, UserId};

pub const TEST_SEED: u64 = 7;

/// Creates a board over a fresh in-memory store with a seeded generator
pub fn create_test_board() -> (Board, Arc<MemoryBoardStore>) {
    let store = Arc::new(MemoryBoardStore::new());
    let engine = ClaimEngine::with_seed(store.clone(), TEST_SEED);
    (Board::with_claim_engine(store.clone(), engine), store)
}

/// Sum of live and archived awards recorded for a user
pub async fn recorded_points<S: BoardStore + ?Sized>(store: &S, user_id: UserId) -> i64 {
    let live: i64 = store
        .list_recent(u64::MAX)
        .await
        .unwrap()
        .iter()
        .filter(|record| record.user_id == user_id)
        .map(|record| i64::from(record.points_awarded))
        .sum();
    let archived = store.archived_totals(user_id).await.unwrap();
    live + archived.points
}

/// Store wrapper whose first `failures` claims report a conflict without writing anything
pub struct FlakyStore {
    inner: MemoryBoardStore,
    failures: AtomicU32,
    compact_failures: AtomicU32,
    pub attempts: AtomicU32,
    pub compact_attempts: AtomicU32,
}

impl FlakyStore {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemoryBoardStore::new(),
            failures: AtomicU32::new(failures),
            compact_failures: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
            compact_attempts: AtomicU32::new(0),
        }
    }

    /// The first `failures` compactions also conflict
    pub fn with_compact_failures(self, failures: u32) -> Self {
        self.compact_failures.store(failures, Ordering::SeqCst);
        self
    }
}

fn take_failure(remaining: &AtomicU32) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl LedgerStore for FlakyStore {
    async fn create_user(&self, name: &str) -> BoardResult<User> {
        self.inner.create_user(name).await
    }

    async fn get_user(&self, id: UserId) -> BoardResult<User> {
        self.inner.get_user(id).await
    }

    async fn find_by_name(&self, name: &str) -> BoardResult<Option<User>> {
        self.inner.find_by_name(name).await
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn add_points(&self, id: UserId, delta: i64) -> BoardResult<User> {
        self.inner.add_points(id, delta).await
    }
}

#[async_trait]
impl HistoryStore for FlakyStore {
    async fn append(&self, record: ClaimRecord) -> BoardResult<ClaimRecord> {
        self.inner.append(record).await
    }

    async fn list_recent(&self, limit: u64) -> BoardResult<Vec<ClaimRecord>> {
        self.inner.list_recent(limit).await
    }

    async fn compact(&self, retain: u64) -> BoardResult<u64> {
        self.compact_attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.compact_failures) {
            return Err(BoardError::Conflict("database is locked".to_string()));
        }
        self.inner.compact(retain).await
    }

    async fn archived_totals(&self, user_id: UserId) -> BoardResult<ArchivedTotals> {
        self.inner.archived_totals(user_id).await
    }
}

#[async_trait]
impl BoardStore for FlakyStore {
    async fn record_claim(&self, user_id: UserId, points: i32) -> BoardResult<(User, ClaimRecord)> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures) {
            return Err(BoardError::Conflict("database is locked".to_string()));
        }
        self.inner.record_claim(user_id, points).await
    }
}
