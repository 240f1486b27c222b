use std::collections::HashMap;

use async_trait::async_trait;
use board_core::validation::normalize_user_name;
use board_core::{BoardError, BoardResult, BoardStore, HistoryStore, LedgerStore};
use board_types::{ArchivedTotals, ClaimRecord, User, UserId};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{claim_archives, claim_records, prelude::*, users};
use crate::errors::DbResultExt;

/// SQLite-backed ledger and claim history.
pub struct BoardRepository {
    db: DatabaseConnection,
}

impl BoardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn model_to_user(model: users::Model) -> User {
        User {
            id: model.id,
            name: model.name,
            total_points: model.total_points,
            created_at: model.created_at,
        }
    }

    fn model_to_record(model: claim_records::Model) -> ClaimRecord {
        ClaimRecord {
            id: model.id,
            user_id: model.user_id,
            user_name: model.user_name,
            points_awarded: model.points_awarded,
            timestamp: model.created_at,
        }
    }

    async fn find_user<C: ConnectionTrait>(conn: &C, id: UserId) -> BoardResult<User> {
        Users::find_by_id(id)
            .one(conn)
            .await
            .or_board_error()?
            .map(Self::model_to_user)
            .ok_or_else(|| BoardError::user_not_found(id))
    }

    async fn increment_points<C: ConnectionTrait>(
        conn: &C,
        id: UserId,
        delta: i64,
    ) -> BoardResult<User> {
        if delta < 0 {
            return Err(BoardError::validation("Points can only be added"));
        }

        // One UPDATE statement, so concurrent increments cannot overwrite each other
        let result = Users::update_many()
            .col_expr(
                users::Column::TotalPoints,
                Expr::col(users::Column::TotalPoints).add(delta),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(conn)
            .await
            .or_board_error()?;

        if result.rows_affected == 0 {
            return Err(BoardError::user_not_found(id));
        }

        Self::find_user(conn, id).await
    }

    async fn insert_record<C: ConnectionTrait>(conn: &C, record: &ClaimRecord) -> BoardResult<()> {
        let model = claim_records::ActiveModel {
            seq: ActiveValue::NotSet,
            id: ActiveValue::Set(record.id),
            user_id: ActiveValue::Set(record.user_id),
            user_name: ActiveValue::Set(record.user_name.clone()),
            points_awarded: ActiveValue::Set(record.points_awarded),
            created_at: ActiveValue::Set(record.timestamp),
        };

        ClaimRecords::insert(model)
            .exec(conn)
            .await
            .or_board_error()?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for BoardRepository {
    async fn create_user(&self, name: &str) -> BoardResult<User> {
        let name = normalize_user_name(name)?;
        let now = Utc::now();

        let user_model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name),
            total_points: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let saved = user_model.insert(&self.db).await.or_board_error()?;
        Ok(Self::model_to_user(saved))
    }

    async fn get_user(&self, id: UserId) -> BoardResult<User> {
        Self::find_user(&self.db, id).await
    }

    async fn find_by_name(&self, name: &str) -> BoardResult<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Name.eq(name))
            .order_by_asc(users::Column::CreatedAt)
            .one(&self.db)
            .await
            .or_board_error()?;

        Ok(user_model.map(Self::model_to_user))
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        let users = Users::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .or_board_error()?;

        Ok(users.into_iter().map(Self::model_to_user).collect())
    }

    async fn add_points(&self, id: UserId, delta: i64) -> BoardResult<User> {
        Self::increment_points(&self.db, id, delta).await
    }
}

#[async_trait]
impl HistoryStore for BoardRepository {
    async fn append(&self, record: ClaimRecord) -> BoardResult<ClaimRecord> {
        let txn = self.db.begin().await.or_board_error()?;

        Self::find_user(&txn, record.user_id).await?;
        Self::insert_record(&txn, &record).await?;

        txn.commit().await.or_board_error()?;
        Ok(record)
    }

    async fn list_recent(&self, limit: u64) -> BoardResult<Vec<ClaimRecord>> {
        // SQLite LIMIT is a signed 64-bit value
        let limit = limit.min(i64::MAX as u64);

        let records = ClaimRecords::find()
            .order_by_desc(claim_records::Column::CreatedAt)
            .order_by_desc(claim_records::Column::Seq)
            .limit(limit)
            .all(&self.db)
            .await
            .or_board_error()?;

        Ok(records.into_iter().map(Self::model_to_record).collect())
    }

    async fn compact(&self, retain: u64) -> BoardResult<u64> {
        let txn = self.db.begin().await.or_board_error()?;

        let live = ClaimRecords::find().count(&txn).await.or_board_error()?;
        let excess = live.saturating_sub(retain);
        if excess == 0 {
            return Ok(0);
        }

        let oldest = ClaimRecords::find()
            .order_by_asc(claim_records::Column::Seq)
            .limit(excess)
            .all(&txn)
            .await
            .or_board_error()?;

        let mut folded: HashMap<Uuid, ArchivedTotals> = HashMap::new();
        let mut last_seq = 0;
        for record in &oldest {
            let totals = folded.entry(record.user_id).or_default();
            totals.points += i64::from(record.points_awarded);
            totals.claims += 1;
            last_seq = last_seq.max(record.seq);
        }

        for (user_id, totals) in folded {
            let updated = ClaimArchives::update_many()
                .col_expr(
                    claim_archives::Column::Points,
                    Expr::col(claim_archives::Column::Points).add(totals.points),
                )
                .col_expr(
                    claim_archives::Column::Claims,
                    Expr::col(claim_archives::Column::Claims).add(totals.claims),
                )
                .filter(claim_archives::Column::UserId.eq(user_id))
                .exec(&txn)
                .await
                .or_board_error()?;

            if updated.rows_affected == 0 {
                claim_archives::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    points: ActiveValue::Set(totals.points),
                    claims: ActiveValue::Set(totals.claims),
                }
                .insert(&txn)
                .await
                .or_board_error()?;
            }
        }

        ClaimRecords::delete_many()
            .filter(claim_records::Column::Seq.lte(last_seq))
            .exec(&txn)
            .await
            .or_board_error()?;

        txn.commit().await.or_board_error()?;
        Ok(oldest.len() as u64)
    }

    async fn archived_totals(&self, user_id: UserId) -> BoardResult<ArchivedTotals> {
        Self::find_user(&self.db, user_id).await?;

        let archive = ClaimArchives::find_by_id(user_id)
            .one(&self.db)
            .await
            .or_board_error()?;

        Ok(archive
            .map(|model| ArchivedTotals {
                points: model.points,
                claims: model.claims,
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl BoardStore for BoardRepository {
    async fn record_claim(&self, user_id: UserId, points: i32) -> BoardResult<(User, ClaimRecord)> {
        // Dropping the transaction on any error rolls both writes back
        let txn = self.db.begin().await.or_board_error()?;

        let user = Self::increment_points(&txn, user_id, i64::from(points)).await?;
        let record = ClaimRecord::new(&user, points);
        Self::insert_record(&txn, &record).await?;

        txn.commit().await.or_board_error()?;
        Ok((user, record))
    }
}
