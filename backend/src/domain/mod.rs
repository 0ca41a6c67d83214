//! Domain primitives, aggregates and services.
//!
//! Purpose: define the marketplace's strongly typed entities (users,
//! listings, media objects, reward ledger entries) and the services that
//! implement the driving ports. Nothing here depends on Actix or Diesel;
//! adapters talk to the domain through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport agnostic failure payload.
//! - [`Listing`] and friends: the claimable waste listing aggregate.
//! - [`User`], [`Username`], [`UserType`]: marketplace accounts.
//! - Services: [`ListingService`], [`RewardService`], [`AccountService`],
//!   [`MediaService`].

pub mod account_service;
pub mod auth;
pub mod error;
pub mod listing;
pub mod listing_service;
pub mod media;
pub mod media_service;
pub mod ports;
pub mod reward;
pub mod reward_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, TokenIdentityResolver};
pub use self::auth::{
    AccessToken, Identity, LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationInput, RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::listing::{
    ClaimRejection, Coordinates, Listing, ListingDetails, ListingDraft, ListingFilter, ListingId,
    ListingPatch, ListingRecord, ListingSelection, ListingStatus, ListingValidationError,
    MutationRejection, WasteTypeSet,
};
pub use self::listing_service::ListingService;
pub use self::media::{
    ImageFormat, ImageUpload, MediaKey, MediaObject, MediaValidationError, StoredMedia,
};
pub use self::media_service::MediaService;
pub use self::reward::{
    CLAIM_REWARD_POINTS, Coupon, CouponCategory, RewardAccount, RewardStatus,
};
pub use self::reward_service::RewardService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Aadhaar, PasswordHash, RoleProfile, RoleProfileInput, User, UserAccount, UserType,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use ecoswap::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
