//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserAccount, UserType, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// An account with the same username and role exists.
        Duplicate { username: String, user_type: String } =>
            "user {username} already registered as {user_type}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; fails with `Duplicate` for a taken
    /// `(username, type)` pair.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch the account registered under `username` for `user_type`.
    async fn find_account(
        &self,
        username: &Username,
        user_type: UserType,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Every role registered under `username`.
    async fn find_by_username(&self, username: &Username)
    -> Result<Vec<User>, UserPersistenceError>;
}
