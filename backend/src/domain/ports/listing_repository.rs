//! Port for listing persistence.
//!
//! State transitions are conditional writes: adapters apply them only while
//! the stored status still allows it, so concurrent callers cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Listing, ListingId, ListingPatch, ListingSelection, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing repository query failed: {message}",
    }
}

/// Result of a conditional listing write.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalWrite {
    /// The write was applied; carries the stored listing afterwards.
    Applied(Listing),
    /// The guard failed; carries the listing as currently stored.
    Rejected(Listing),
    /// No listing has the requested identifier.
    Missing,
}

/// Port for reading and mutating listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a newly created listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Find a listing by id, including soft-deleted ones.
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Return listings matching `selection`, newest first.
    async fn list(
        &self,
        selection: &ListingSelection,
    ) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Mark the listing claimed by `claimant` only while it is available.
    async fn claim_if_available(
        &self,
        id: &ListingId,
        claimant: &Username,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError>;

    /// Apply `patch` and append `new_image_urls` to the stored listing only
    /// while it is available. Images already stored are always kept.
    async fn update_if_available(
        &self,
        id: &ListingId,
        patch: &ListingPatch,
        new_image_urls: &[String],
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError>;

    /// Soft delete the listing unless it is already deleted.
    async fn soft_delete(
        &self,
        id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError>;
}
