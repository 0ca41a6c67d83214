//! PostgreSQL-backed `UserRepository`.
//!
//! The role profile is stored as tagged JSON; the `user_type` column is the
//! second half of the primary key and must agree with the profile's tag.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{PasswordHash, RoleProfile, User, UserAccount, UserType, Username};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let UserRow {
        username,
        user_type,
        phone,
        email,
        password_hash,
        profile,
        created_at,
    } = row;
    let corrupt =
        |err: String| UserPersistenceError::query(format!("user {username} is corrupt: {err}"));

    let profile: RoleProfile =
        serde_json::from_value(profile).map_err(|err| corrupt(err.to_string()))?;
    if profile.user_type().as_str() != user_type {
        return Err(corrupt(format!(
            "profile type {} does not match {user_type}",
            profile.user_type()
        )));
    }
    let name = Username::new(&username).map_err(|err| corrupt(err.to_string()))?;
    let user = User::try_new(name, &phone, email.as_deref(), profile, created_at)
        .map_err(|err| corrupt(err.to_string()))?;
    Ok(UserAccount {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let profile = serde_json::to_value(user.profile())
            .map_err(|err| UserPersistenceError::query(format!("serialise profile: {err}")))?;
        let row = NewUserRow {
            username: user.username().as_ref(),
            user_type: user.user_type().as_str(),
            phone: user.phone(),
            email: user.email(),
            password_hash: account.password_hash.as_str(),
            profile: &profile,
            created_at: user.created_at(),
        };

        match diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(UserPersistenceError::duplicate(
                row.username,
                row.user_type,
            )),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn find_account(
        &self,
        username: &Username,
        user_type: UserType,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .filter(users::user_type.eq(user_type.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = users::table
            .filter(users::username.eq(username.as_ref()))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| row_to_account(row).map(|account| account.user))
            .collect()
    }
}
