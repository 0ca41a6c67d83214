//! In-memory `RewardRepository`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{RewardRepository, RewardRepositoryError};
use crate::domain::{RewardAccount, Username};

use super::lock;

/// Reward ledger held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRewardRepository {
    accounts: Mutex<HashMap<Username, RewardAccount>>,
}

impl InMemoryRewardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardRepository for InMemoryRewardRepository {
    async fn find(
        &self,
        username: &Username,
    ) -> Result<Option<RewardAccount>, RewardRepositoryError> {
        let accounts = lock(&self.accounts, RewardRepositoryError::query)?;
        Ok(accounts.get(username).cloned())
    }

    async fn award(
        &self,
        username: &Username,
        points: i64,
    ) -> Result<RewardAccount, RewardRepositoryError> {
        let mut accounts = lock(&self.accounts, RewardRepositoryError::query)?;
        let account = accounts
            .entry(username.clone())
            .or_insert_with(|| RewardAccount {
                username: username.clone(),
                score: 0,
                redeemed_points: 0,
            });
        account.score = account.score.saturating_add(points);
        Ok(account.clone())
    }

    async fn mark_redeemed(
        &self,
        username: &Username,
        score: i64,
    ) -> Result<bool, RewardRepositoryError> {
        let mut accounts = lock(&self.accounts, RewardRepositoryError::query)?;
        match accounts.get_mut(username) {
            Some(account) if account.redeemed_points < score && score <= account.score => {
                account.redeemed_points = score;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
