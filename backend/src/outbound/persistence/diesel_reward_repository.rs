//! PostgreSQL-backed `RewardRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RewardRepository, RewardRepositoryError};
use crate::domain::{RewardAccount, Username};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRewardRow, RewardRow};
use super::pool::{DbPool, PoolError};
use super::schema::rewards;

/// Diesel-backed implementation of the reward repository port.
#[derive(Clone)]
pub struct DieselRewardRepository {
    pool: DbPool,
}

impl DieselRewardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RewardRepositoryError {
    map_basic_pool_error(error, RewardRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RewardRepositoryError {
    map_basic_diesel_error(
        error,
        RewardRepositoryError::query,
        RewardRepositoryError::connection,
    )
}

fn row_to_account(row: RewardRow) -> Result<RewardAccount, RewardRepositoryError> {
    let username = Username::new(&row.username).map_err(|err| {
        RewardRepositoryError::query(format!("reward row {} is corrupt: {err}", row.username))
    })?;
    Ok(RewardAccount {
        username,
        score: row.score,
        redeemed_points: row.redeemed_points,
    })
}

#[async_trait]
impl RewardRepository for DieselRewardRepository {
    async fn find(
        &self,
        username: &Username,
    ) -> Result<Option<RewardAccount>, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = rewards::table
            .filter(rewards::username.eq(username.as_ref()))
            .select(RewardRow::as_select())
            .first::<RewardRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn award(
        &self,
        username: &Username,
        points: i64,
    ) -> Result<RewardAccount, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRewardRow {
            username: username.as_ref(),
            score: points,
            redeemed_points: 0,
        };
        let updated = diesel::insert_into(rewards::table)
            .values(&row)
            .on_conflict(rewards::username)
            .do_update()
            .set((
                rewards::score.eq(rewards::score + excluded(rewards::score)),
                rewards::updated_at.eq(diesel::dsl::now),
            ))
            .returning(RewardRow::as_returning())
            .get_result::<RewardRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_account(updated)
    }

    async fn mark_redeemed(
        &self,
        username: &Username,
        score: i64,
    ) -> Result<bool, RewardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changed = diesel::update(
            rewards::table
                .filter(rewards::username.eq(username.as_ref()))
                .filter(rewards::redeemed_points.lt(score))
                .filter(rewards::score.ge(score)),
        )
        .set((
            rewards::redeemed_points.eq(score),
            rewards::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(changed == 1)
    }
}
