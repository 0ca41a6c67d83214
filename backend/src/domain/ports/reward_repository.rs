//! Port for reward ledger persistence.

use async_trait::async_trait;

use crate::domain::{RewardAccount, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reward repository adapters.
    pub enum RewardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reward repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reward repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// Load the ledger entry for `username`.
    async fn find(&self, username: &Username)
    -> Result<Option<RewardAccount>, RewardRepositoryError>;

    /// Add `points` to the score, creating the entry when absent.
    async fn award(
        &self,
        username: &Username,
        points: i64,
    ) -> Result<RewardAccount, RewardRepositoryError>;

    /// Set `redeemed_points` to `score` only while it is still below `score`.
    ///
    /// Returns `false` when another redemption got there first.
    async fn mark_redeemed(
        &self,
        username: &Username,
        score: i64,
    ) -> Result<bool, RewardRepositoryError>;
}
