//! Driving ports for signup, login and token resolution.
//!
//! Handlers depend on these traits rather than on hashing or token
//! infrastructure, so handler tests can substitute doubles.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, Identity, LoginCredentials, Registration, User, UserType};

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_type: UserType,
    pub token: AccessToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a new account.
    async fn signup(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials and issue a bearer token.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;
}

/// Resolve a presented bearer token into the caller's identity.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Identity, Error>;
}
