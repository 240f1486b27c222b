//! In-memory board store, used by tests and when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use board_types::{ArchivedTotals, ClaimRecord, User, UserId};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::validation::normalize_user_name;
use crate::{BoardError, BoardResult, BoardStore, HistoryStore, LedgerStore};

#[derive(Debug, Default)]
struct BoardState {
    users: Vec<User>,
    index: HashMap<UserId, usize>,
    history: Vec<ClaimRecord>, // insertion order
    archives: HashMap<UserId, ArchivedTotals>,
}

impl BoardState {
    fn user_mut(&mut self, id: UserId) -> BoardResult<&mut User> {
        let position = *self
            .index
            .get(&id)
            .ok_or_else(|| BoardError::user_not_found(id))?;
        Ok(&mut self.users[position])
    }

    fn user(&self, id: UserId) -> BoardResult<&User> {
        self.index
            .get(&id)
            .map(|&position| &self.users[position])
            .ok_or_else(|| BoardError::user_not_found(id))
    }

    fn add_points(&mut self, id: UserId, delta: i64) -> BoardResult<User> {
        if delta < 0 {
            return Err(BoardError::validation("Points can only be added"));
        }

        let user = self.user_mut(id)?;
        user.total_points = user
            .total_points
            .checked_add(delta)
            .ok_or_else(|| BoardError::Storage(format!("Point total overflow for user {}", id)))?;
        Ok(user.clone())
    }
}

/// Users, history and archives live behind a single lock, so a claim's
/// increment and its history record become visible to readers together.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    state: RwLock<BoardState>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryBoardStore {
    async fn create_user(&self, name: &str) -> BoardResult<User> {
        let name = normalize_user_name(name)?;
        let user = User {
            id: Uuid::new_v4(),
            name,
            total_points: 0,
            created_at: Utc::now(),
        };

        let mut state = self.state.write().await;
        let position = state.users.len();
        state.index.insert(user.id, position);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> BoardResult<User> {
        let state = self.state.read().await;
        state.user(id).cloned()
    }

    async fn find_by_name(&self, name: &str) -> BoardResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.name == name).cloned())
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state.users.clone())
    }

    async fn add_points(&self, id: UserId, delta: i64) -> BoardResult<User> {
        let mut state = self.state.write().await;
        state.add_points(id, delta)
    }
}

#[async_trait]
impl HistoryStore for MemoryBoardStore {
    async fn append(&self, record: ClaimRecord) -> BoardResult<ClaimRecord> {
        let mut state = self.state.write().await;
        state.user(record.user_id)?;
        state.history.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: u64) -> BoardResult<Vec<ClaimRecord>> {
        let state = self.state.read().await;

        // Reverse insertion order first; the stable sort keeps it for equal timestamps
        let mut records: Vec<&ClaimRecord> = state.history.iter().rev().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(records.into_iter().take(limit).cloned().collect())
    }

    async fn compact(&self, retain: u64) -> BoardResult<u64> {
        let mut state = self.state.write().await;

        let retain = usize::try_from(retain).unwrap_or(usize::MAX);
        let excess = state.history.len().saturating_sub(retain);
        if excess == 0 {
            return Ok(0);
        }

        let folded: Vec<ClaimRecord> = state.history.drain(..excess).collect();
        for record in &folded {
            let archive = state.archives.entry(record.user_id).or_default();
            archive.points += i64::from(record.points_awarded);
            archive.claims += 1;
        }

        Ok(folded.len() as u64)
    }

    async fn archived_totals(&self, user_id: UserId) -> BoardResult<ArchivedTotals> {
        let state = self.state.read().await;
        state.user(user_id)?;
        Ok(state.archives.get(&user_id).copied().unwrap_or_default())
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn record_claim(&self, user_id: UserId, points: i32) -> BoardResult<(User, ClaimRecord)> {
        let mut state = self.state.write().await;

        // Both steps run under one write guard; the increment is the only fallible one
        let user = state.add_points(user_id, i64::from(points))?;
        let record = ClaimRecord::new(&user, points);
        state.history.push(record.clone());

        Ok((user, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let store = MemoryBoardStore::new();

        let created = store.create_user("  Alice  ").await.unwrap();
        assert_eq!(created.name, "Alice");
        assert_eq!(created.total_points, 0);

        let found = store.get_user(created.id).await.unwrap();
        assert_eq!(found, created);

        let by_name = store.find_by_name("Alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert!(store.find_by_name("Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_rejects_blank_names() {
        let store = MemoryBoardStore::new();

        for name in ["", "   "] {
            let err = store.create_user(name).await.unwrap_err();
            assert!(matches!(err, BoardError::Validation(_)));
        }
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let store = MemoryBoardStore::new();

        let first = store.create_user("Sam").await.unwrap();
        let second = store.create_user("Sam").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_users_in_creation_order() {
        let store = MemoryBoardStore::new();
        for name in ["A", "B", "C"] {
            store.create_user(name).await.unwrap();
        }

        let names: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_add_points() {
        let store = MemoryBoardStore::new();
        let user = store.create_user("Alice").await.unwrap();

        store.add_points(user.id, 4).await.unwrap();
        let updated = store.add_points(user.id, 6).await.unwrap();
        assert_eq!(updated.total_points, 10);

        let err = store.add_points(user.id, -1).await.unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));

        let err = store.add_points(Uuid::new_v4(), 1).await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let store = MemoryBoardStore::new();
        let err = store.get_user(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_append_requires_existing_user() {
        let store = MemoryBoardStore::new();
        let ghost = User {
            id: Uuid::new_v4(),
            name: "Ghost".to_string(),
            total_points: 0,
            created_at: Utc::now(),
        };

        let err = store.append(ClaimRecord::new(&ghost, 3)).await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
        assert!(store.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first_with_limit() {
        let store = MemoryBoardStore::new();
        let user = store.create_user("Alice").await.unwrap();

        for points in 1..=5 {
            store.append(ClaimRecord::new(&user, points)).await.unwrap();
        }

        let recent = store.list_recent(3).await.unwrap();
        let points: Vec<i32> = recent.iter().map(|r| r.points_awarded).collect();
        assert_eq!(points, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_list_recent_equal_timestamps_use_insertion_order() {
        let store = MemoryBoardStore::new();
        let user = store.create_user("Alice").await.unwrap();

        let timestamp = Utc::now();
        for points in 1..=3 {
            let mut record = ClaimRecord::new(&user, points);
            record.timestamp = timestamp;
            store.append(record).await.unwrap();
        }

        let recent = store.list_recent(10).await.unwrap();
        let points: Vec<i32> = recent.iter().map(|r| r.points_awarded).collect();
        assert_eq!(points, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_record_claim_updates_ledger_and_history_together() {
        let store = MemoryBoardStore::new();
        let user = store.create_user("Alice").await.unwrap();

        let (updated, record) = store.record_claim(user.id, 7).await.unwrap();
        assert_eq!(updated.total_points, 7);
        assert_eq!(record.user_id, user.id);
        assert_eq!(record.user_name, "Alice");
        assert_eq!(record.points_awarded, 7);

        let history = store.list_recent(10).await.unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn test_record_claim_unknown_user_leaves_no_trace() {
        let store = MemoryBoardStore::new();
        store.create_user("Alice").await.unwrap();

        let err = store.record_claim(Uuid::new_v4(), 5).await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
        assert!(store.list_recent(10).await.unwrap().is_empty());
        assert_eq!(store.list_users().await.unwrap()[0].total_points, 0);
    }

    #[tokio::test]
    async fn test_compact_folds_oldest_records_into_archive() {
        let store = MemoryBoardStore::new();
        let alice = store.create_user("Alice").await.unwrap();
        let bob = store.create_user("Bob").await.unwrap();

        store.record_claim(alice.id, 3).await.unwrap();
        store.record_claim(bob.id, 4).await.unwrap();
        store.record_claim(alice.id, 5).await.unwrap();
        store.record_claim(bob.id, 6).await.unwrap();

        assert_eq!(store.compact(2).await.unwrap(), 2);
        assert_eq!(store.compact(2).await.unwrap(), 0);

        let remaining: Vec<i32> = store
            .list_recent(10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.points_awarded)
            .collect();
        assert_eq!(remaining, vec![6, 5]);

        assert_eq!(
            store.archived_totals(alice.id).await.unwrap(),
            ArchivedTotals {
                points: 3,
                claims: 1
            }
        );
        assert_eq!(
            store.archived_totals(bob.id).await.unwrap(),
            ArchivedTotals {
                points: 4,
                claims: 1
            }
        );

        // Ledger totals are untouched by compaction
        assert_eq!(store.get_user(alice.id).await.unwrap().total_points, 8);
        assert_eq!(store.get_user(bob.id).await.unwrap().total_points, 10);
    }
}
