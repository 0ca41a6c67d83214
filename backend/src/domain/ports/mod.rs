//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`MediaLibrary`],
//! [`IdentityResolver`]) are called by inbound adapters. Driven ports
//! (repositories, stores, hashers and token issuers) are implemented by
//! outbound adapters and injected into the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod coupon_catalogue;
mod listing_command;
mod listing_query;
mod listing_repository;
mod media_library;
mod media_store;
mod password_hasher;
mod reward_query;
mod reward_repository;
mod token_issuer;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockIdentityResolver};
pub use account_command::{AccountCommand, IdentityResolver, LoginOutcome};
#[cfg(test)]
pub use coupon_catalogue::MockCouponCatalogue;
pub use coupon_catalogue::{CouponCatalogue, CouponCatalogueError};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::{CreateListingRequest, ListingCommand, UpdateListingRequest};
#[cfg(test)]
pub use listing_query::MockListingQuery;
pub use listing_query::ListingQuery;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ConditionalWrite, ListingRepository, ListingRepositoryError};
#[cfg(test)]
pub use media_library::MockMediaLibrary;
pub use media_library::MediaLibrary;
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use reward_query::{MockRewardCommand, MockRewardQuery};
pub use reward_query::{RewardCommand, RewardQuery};
#[cfg(test)]
pub use reward_repository::MockRewardRepository;
pub use reward_repository::{RewardRepository, RewardRepositoryError};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
