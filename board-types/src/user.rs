use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[ts(type = "number")]
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

/// A user annotated with its 1-based position in the current ranking.
/// Never stored; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RankedUser {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateUserRequest {
    pub name: String,
}
