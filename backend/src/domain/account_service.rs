//! Account domain service: signup, login, profiles and token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountCommand, IdentityResolver, LoginOutcome, PasswordHashError, PasswordHasher,
    TokenError, TokenIssuer, UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    Error, Identity, LoginCredentials, Registration, User, UserAccount, UserType, Username,
};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate {
            username,
            user_type,
        } => Error::conflict(format!("{username} is already registered as {user_type}"))
            .with_details(json!({ "field": "username", "code": "duplicate" })),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid username, password or user type")
}

/// Account service implementing [`AccountCommand`] and [`UserProfileQuery`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn signup(&self, registration: Registration) -> Result<User, Error> {
        let user = User::try_new(
            registration.username().clone(),
            registration.phone(),
            registration.email(),
            registration.profile().clone(),
            self.clock.utc(),
        )
        .map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": err.field(), "code": "invalid_field" }))
        })?;
        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;

        let account = UserAccount {
            user,
            password_hash,
        };
        self.users
            .insert(&account)
            .await
            .map_err(map_repository_error)?;

        info!(
            username = %account.user.username(),
            user_type = %account.user.user_type(),
            "account registered"
        );
        Ok(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(invalid_credentials());
        };
        let account = self
            .users
            .find_account(&username, credentials.user_type())
            .await
            .map_err(map_repository_error)?;
        let Some(account) = account else {
            debug!(%username, user_type = %credentials.user_type(), "login for unknown account");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(%username, "login with wrong password");
            return Err(invalid_credentials());
        }

        let identity = Identity {
            username,
            user_type: credentials.user_type(),
        };
        let token = self
            .tokens
            .issue(&identity)
            .map_err(|err| Error::internal(err.to_string()))?;
        info!(username = %identity.username, user_type = %identity.user_type, "login succeeded");
        Ok(LoginOutcome {
            user_type: identity.user_type,
            token,
        })
    }
}

#[async_trait]
impl UserProfileQuery for AccountService {
    async fn fetch_profile(
        &self,
        username: &Username,
        user_type: Option<UserType>,
    ) -> Result<User, Error> {
        let missing = || Error::not_found(format!("user {username} not found"));
        match user_type {
            Some(user_type) => self
                .users
                .find_account(username, user_type)
                .await
                .map_err(map_repository_error)?
                .map(|account| account.user)
                .ok_or_else(missing),
            None => self
                .users
                .find_by_username(username)
                .await
                .map_err(map_repository_error)?
                .into_iter()
                .min_by_key(User::created_at)
                .ok_or_else(missing),
        }
    }
}

/// [`IdentityResolver`] backed by a [`TokenIssuer`].
#[derive(Clone)]
pub struct TokenIdentityResolver {
    tokens: Arc<dyn TokenIssuer>,
}

impl TokenIdentityResolver {
    pub fn new(tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { tokens }
    }
}

impl IdentityResolver for TokenIdentityResolver {
    fn resolve(&self, token: &str) -> Result<Identity, Error> {
        self.tokens.verify(token).map_err(|err| match err {
            TokenError::Expired => Error::unauthorized("token expired"),
            TokenError::Invalid { .. } => Error::unauthorized("invalid token"),
            TokenError::Signing { message } => Error::internal(message),
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
