//! In-process adapters for every driven port.
//!
//! Used when no `DATABASE_URL` is configured and by the integration tests.
//! Each store keeps its state behind a single `std::sync::Mutex`; guards are
//! never held across an `.await`, so conditional writes (claim, redeem) are
//! check-and-set operations under one lock acquisition.

mod coupons;
mod listings;
mod media;
mod rewards;
mod users;

pub use coupons::InMemoryCouponCatalogue;
pub use listings::InMemoryListingRepository;
pub use media::InMemoryMediaStore;
pub use rewards::InMemoryRewardRepository;
pub use users::InMemoryUserRepository;

use std::sync::{Mutex, MutexGuard};

/// Lock a store, reporting poisoning through the caller's error type.
fn lock<'a, T, E>(
    store: &'a Mutex<T>,
    poisoned: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    store.lock().map_err(|_| poisoned("in-memory store lock poisoned"))
}
