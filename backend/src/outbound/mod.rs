//! Outbound adapters implementing the domain's driven ports.
//!
//! - [`persistence`]: PostgreSQL repositories via Diesel.
//! - [`memory`]: in-process stores used without a database and in tests.
//! - [`media`]: filesystem image storage through `cap_std`.
//! - [`token`]: HS256 bearer tokens.
//! - [`credentials`]: Argon2id password hashing.

pub mod credentials;
pub mod media;
pub mod memory;
pub mod persistence;
pub mod token;
