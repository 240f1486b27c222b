use std::cmp::Ordering;

use board_types::{RankedUser, User, UserId};

pub struct RankingEngine;

impl RankingEngine {
    /// Order users by points (highest first) and number them from 1.
    ///
    /// Ties fall back to creation time and then id, so the result is a strict
    /// total order and the same snapshot always ranks the same way.
    pub fn rank(mut users: Vec<User>) -> Vec<RankedUser> {
        users.sort_by(Self::compare);

        users
            .into_iter()
            .zip(1u32..)
            .map(|(user, rank)| RankedUser { user, rank })
            .collect()
    }

    pub fn rank_of(users: Vec<User>, id: UserId) -> Option<RankedUser> {
        Self::rank(users)
            .into_iter()
            .find(|ranked| ranked.user.id == id)
    }

    fn compare(a: &User, b: &User) -> Ordering {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}
