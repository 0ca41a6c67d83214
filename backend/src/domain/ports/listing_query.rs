//! Driving port for listing reads.

use async_trait::async_trait;

use crate::domain::{Error, Listing, ListingFilter, ListingId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// Listings matching `filter`, newest first.
    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, Error>;

    /// A single live listing.
    async fn get_listing(&self, id: &ListingId) -> Result<Listing, Error>;
}
