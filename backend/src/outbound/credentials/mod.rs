//! Argon2id adapter for the [`PasswordHasher`] port.
//!
//! Hashes are stored as PHC strings. Hashing is CPU bound, so both operations
//! run on the blocking pool.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier, SaltString,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

async fn run_blocking<T, F>(op: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| PasswordHashError::hashing(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|phc| PasswordHash::new(phc.to_string()))
                .map_err(|err| PasswordHashError::hashing(err.to_string()))
        })
        .await
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let stored = hash.as_str().to_owned();
        run_blocking(move || {
            let parsed = PhcString::new(&stored)
                .map_err(|err| PasswordHashError::malformed(err.to_string()))?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(PasswordHashError::hashing(err.to_string())),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("secret1").await.expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("secret1", &hash).await.expect("verify"));
        assert!(!hasher.verify("secret2", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_is_reported() {
        let error = Argon2PasswordHasher
            .verify("secret1", &PasswordHash::new("plaintext"))
            .await
            .expect_err("malformed");
        assert!(matches!(error, PasswordHashError::Malformed { .. }));
    }
}
