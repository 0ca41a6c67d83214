//! Port for signing and verifying bearer tokens.

use crate::domain::{AccessToken, Identity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token's expiry has passed.
        Expired => "token expired",
        /// The token is malformed, tampered with or names an unknown role.
        Invalid { message: String } => "invalid token: {message}",
        /// Signing a new token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `identity`.
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenError>;

    /// Verify a presented token and return the identity it carries.
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}
