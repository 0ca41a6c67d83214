//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories implement the domain's driven ports on top of `diesel-async`
//! and a `bb8` pool. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; every row is converted into a
//! validated domain value before it leaves an adapter, and a row that fails
//! validation is reported as a query error rather than silently skipped.
//!
//! ```ignore
//! use ecoswap::outbound::persistence::{DbPool, DieselListingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ecoswap")).await?;
//! let listings = DieselListingRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_coupon_catalogue;
mod diesel_listing_repository;
mod diesel_reward_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_coupon_catalogue::DieselCouponCatalogue;
pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_reward_repository::DieselRewardRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
