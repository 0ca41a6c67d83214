//! Driving ports for the reward ledger.

use async_trait::async_trait;

use crate::domain::{Error, RewardAccount, RewardStatus, Username};

/// Read side: coupon issuance for a user's current score.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardQuery: Send + Sync {
    /// Report the score and issue a coupon when one is due.
    async fn reward_status(&self, username: &Username) -> Result<RewardStatus, Error>;
}

/// Write side: crediting points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardCommand: Send + Sync {
    /// Add a positive number of points to `username`'s score.
    async fn award_points(&self, username: &Username, points: i64) -> Result<RewardAccount, Error>;
}
