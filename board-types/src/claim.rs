use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{User, UserId};

/// One entry of the append-only claim log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClaimRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub user_name: String, // snapshot of the name at claim time
    pub points_awarded: i32,
    pub timestamp: DateTime<Utc>,
}

impl ClaimRecord {
    pub fn new(user: &User, points_awarded: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            user_name: user.name.clone(),
            points_awarded,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClaimRequest {
    // Kept as a string so a malformed id reads as an unknown user rather than a bad body
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClaimResult {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub user_id: UserId,
    pub user_name: String,
    pub points_awarded: i32,
    #[ts(type = "number")]
    pub new_total_points: i64,
    pub record: ClaimRecord,
}

impl ClaimResult {
    pub fn new(user: User, record: ClaimRecord) -> Self {
        let message = format!(
            "{} earned {} points! New total: {}",
            user.name, record.points_awarded, user.total_points
        );
        Self {
            success: true,
            message,
            user_id: user.id,
            user_name: user.name.clone(),
            points_awarded: record.points_awarded,
            new_total_points: user.total_points,
            user,
            record,
        }
    }
}

/// Points and claim count folded out of the live history by compaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArchivedTotals {
    #[ts(type = "number")]
    pub points: i64,
    #[ts(type = "number")]
    pub claims: i64,
}
