//! Reward domain service.
//!
//! Scores only grow. A coupon is issued at most once per score: issuing one
//! moves `redeemed_points` up to the score with a guarded write, so two
//! concurrent checks cannot both hand out a coupon.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::domain::ports::{
    CouponCatalogue, CouponCatalogueError, RewardCommand, RewardQuery, RewardRepository,
    RewardRepositoryError,
};
use crate::domain::{CouponCategory, Error, RewardAccount, RewardStatus, Username};

fn map_repository_error(error: RewardRepositoryError) -> Error {
    match error {
        RewardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reward repository unavailable: {message}"))
        }
        RewardRepositoryError::Query { message } => {
            Error::internal(format!("reward repository error: {message}"))
        }
    }
}

fn map_catalogue_error(error: CouponCatalogueError) -> Error {
    match error {
        CouponCatalogueError::Connection { message } => {
            Error::service_unavailable(format!("coupon catalogue unavailable: {message}"))
        }
        CouponCatalogueError::Query { message } => {
            Error::internal(format!("coupon catalogue error: {message}"))
        }
    }
}

/// Reward service implementing [`RewardQuery`] and [`RewardCommand`].
#[derive(Clone)]
pub struct RewardService {
    rewards: Arc<dyn RewardRepository>,
    coupons: Arc<dyn CouponCatalogue>,
}

impl RewardService {
    pub fn new(rewards: Arc<dyn RewardRepository>, coupons: Arc<dyn CouponCatalogue>) -> Self {
        Self { rewards, coupons }
    }

    async fn issue_coupon(
        &self,
        account: &RewardAccount,
        category: CouponCategory,
    ) -> Result<RewardStatus, Error> {
        let score = account.score;
        let pool = self
            .coupons
            .coupons_for(category)
            .await
            .map_err(map_catalogue_error)?;
        let Some(coupon) = pool.choose(&mut rand::thread_rng()).cloned() else {
            debug!(%category, "coupon pool empty");
            return Ok(RewardStatus::PoolEmpty { score });
        };

        let redeemed = self
            .rewards
            .mark_redeemed(&account.username, score)
            .await
            .map_err(map_repository_error)?;
        if !redeemed {
            return Ok(RewardStatus::AlreadyRedeemed { score });
        }

        info!(username = %account.username, score, %category, "coupon issued");
        Ok(RewardStatus::Coupon {
            score,
            coupon_image: coupon.image_url,
        })
    }
}

#[async_trait]
impl RewardQuery for RewardService {
    async fn reward_status(&self, username: &Username) -> Result<RewardStatus, Error> {
        let account = self
            .rewards
            .find(username)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("no reward record for {username}")))?;

        if !account.can_redeem() {
            return Ok(RewardStatus::AlreadyRedeemed {
                score: account.score,
            });
        }
        match CouponCategory::for_score(account.score) {
            None => Ok(RewardStatus::NoCategory {
                score: account.score,
            }),
            Some(category) => self.issue_coupon(&account, category).await,
        }
    }
}

#[async_trait]
impl RewardCommand for RewardService {
    async fn award_points(&self, username: &Username, points: i64) -> Result<RewardAccount, Error> {
        if points <= 0 {
            return Err(Error::invalid_request("points must be positive"));
        }
        let account = self
            .rewards
            .award(username, points)
            .await
            .map_err(map_repository_error)?;
        debug!(%username, points, score = account.score, "points awarded");
        Ok(account)
    }
}

#[cfg(test)]
#[path = "reward_service_tests.rs"]
mod tests;
