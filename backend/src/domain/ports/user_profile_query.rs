//! Driving port for public profile reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserType, Username};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Public profile of `username`; `user_type` picks a role when the name
    /// is registered more than once.
    async fn fetch_profile(
        &self,
        username: &Username,
        user_type: Option<UserType>,
    ) -> Result<User, Error>;
}
