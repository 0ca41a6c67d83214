//! Driving port for listing mutations.
//!
//! Inbound adapters call this port with already validated domain values; the
//! implementation owns ownership checks, role policy and the claim guard.

use async_trait::async_trait;

use crate::domain::{
    Coordinates, Error, Identity, ImageUpload, Listing, ListingDetails, ListingId, ListingPatch,
};

/// Request to create a listing.
#[derive(Debug, Clone)]
pub struct CreateListingRequest {
    pub owner: Identity,
    pub details: ListingDetails,
    pub coordinates: Coordinates,
    pub images: Vec<ImageUpload>,
}

/// Request to edit a listing.
#[derive(Debug, Clone)]
pub struct UpdateListingRequest {
    pub requester: Identity,
    pub listing_id: ListingId,
    pub patch: ListingPatch,
    pub images: Vec<ImageUpload>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Store images and persist a new `available` listing.
    async fn create_listing(&self, request: CreateListingRequest) -> Result<Listing, Error>;

    /// Claim a listing on behalf of `claimant`.
    async fn claim_listing(&self, claimant: &Identity, id: &ListingId) -> Result<Listing, Error>;

    /// Edit an available listing owned by the requester.
    async fn update_listing(&self, request: UpdateListingRequest) -> Result<Listing, Error>;

    /// Soft delete a listing owned by the requester.
    async fn delete_listing(&self, requester: &Identity, id: &ListingId) -> Result<(), Error>;
}
