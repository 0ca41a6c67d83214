//! In-memory `UserRepository`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserAccount, UserType, Username};

use super::lock;

/// Accounts keyed by `(username, type)`.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<(Username, UserType), UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let key = (account.user.username().clone(), account.user.user_type());
        let mut accounts = lock(&self.accounts, UserPersistenceError::query)?;
        if accounts.contains_key(&key) {
            return Err(UserPersistenceError::duplicate(
                key.0.as_ref(),
                key.1.as_str(),
            ));
        }
        accounts.insert(key, account.clone());
        Ok(())
    }

    async fn find_account(
        &self,
        username: &Username,
        user_type: UserType,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let accounts = lock(&self.accounts, UserPersistenceError::query)?;
        Ok(accounts.get(&(username.clone(), user_type)).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let accounts = lock(&self.accounts, UserPersistenceError::query)?;
        let mut users: Vec<User> = accounts
            .values()
            .filter(|account| account.user.username() == username)
            .map(|account| account.user.clone())
            .collect();
        users.sort_by_key(User::created_at);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{PasswordHash, RoleProfile};

    fn account(username: &str, profile: RoleProfile) -> UserAccount {
        let created_at = Utc
            .with_ymd_and_hms(2024, 8, 1, 9, 0, 0)
            .single()
            .expect("timestamp");
        UserAccount {
            user: User::try_new(
                Username::new(username).expect("username"),
                "9876543210",
                None,
                profile,
                created_at,
            )
            .expect("user"),
            password_hash: PasswordHash::new("hash"),
        }
    }

    fn customer() -> RoleProfile {
        RoleProfile::Customer {
            address: "1 Main St".into(),
            aadhaar: None,
        }
    }

    fn business() -> RoleProfile {
        RoleProfile::Business {
            business_name: "Alice Recycling".into(),
            raw_materials: vec!["plastic".into()],
            registration_number: None,
            gst_number: None,
            business_address: None,
            business_type: None,
            rep_name: None,
            rep_role: None,
            rep_phone: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn same_username_may_register_once_per_type() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&account("alice", customer()))
            .await
            .expect("first customer");

        let duplicate = repo
            .insert(&account("alice", customer()))
            .await
            .expect_err("duplicate customer");
        assert_eq!(
            duplicate,
            UserPersistenceError::duplicate("alice", "customer")
        );

        repo.insert(&account("alice", business()))
            .await
            .expect("business registration");
        let alice = Username::new("alice").expect("username");
        let users = repo.find_by_username(&alice).await.expect("lookup");
        assert_eq!(users.len(), 2);
    }
}
