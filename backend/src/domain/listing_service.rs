//! Listing domain service.
//!
//! Implements the listing driving ports: creation with image upload and
//! compensating cleanup, role-aware discovery, the single-claim transition
//! and owner-gated edits and deletes.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ConditionalWrite, CreateListingRequest, ListingCommand, ListingQuery, ListingRepository,
    ListingRepositoryError, MediaStore, RewardCommand, UpdateListingRequest, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    CLAIM_REWARD_POINTS, ClaimRejection, Error, Identity, ImageUpload, Listing, ListingDraft,
    ListingFilter, ListingId, ListingSelection, ListingStatus, MediaKey, MutationRejection,
    StoredMedia, UserType, Username, WasteTypeSet,
};

fn map_repository_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn listing_not_found(id: &ListingId) -> Error {
    Error::not_found(format!("listing {id} not found"))
        .with_details(json!({ "listingId": id.to_string() }))
}

fn already_claimed(id: &ListingId) -> Error {
    Error::conflict("listing already claimed").with_details(json!({ "listingId": id.to_string() }))
}

fn not_available(id: &ListingId, status: ListingStatus) -> Error {
    Error::conflict(format!("listing is {status} and can no longer be changed"))
        .with_details(json!({ "listingId": id.to_string(), "status": status.as_str() }))
}

fn not_owner(action: &str) -> Error {
    Error::forbidden(format!("only the owner may {action} this listing"))
}

/// Listing service implementing [`ListingCommand`] and [`ListingQuery`].
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
    rewards: Arc<dyn RewardCommand>,
    clock: Arc<dyn Clock>,
}

impl ListingService {
    /// Create a listing service over its stores.
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
        rewards: Arc<dyn RewardCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            users,
            media,
            rewards,
            clock,
        }
    }

    async fn load_live(&self, id: &ListingId) -> Result<Listing, Error> {
        self.listings
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .filter(|listing| !listing.is_deleted())
            .ok_or_else(|| listing_not_found(id))
    }

    /// Upload every image concurrently; on any failure remove the ones that
    /// made it and fail the whole batch.
    async fn store_images(&self, images: &[ImageUpload]) -> Result<Vec<StoredMedia>, Error> {
        let uploads = images.iter().map(|image| {
            let media = Arc::clone(&self.media);
            async move {
                let key = MediaKey::generate(image.format());
                media.put(&key, image).await
            }
        });
        let results = join_all(uploads).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_failure = None;
        for result in results {
            match result {
                Ok(media) => stored.push(media),
                Err(err) => {
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            None => Ok(stored),
            Some(err) => {
                warn!(error = %err, uploaded = stored.len(), "image upload failed; rolling back");
                self.discard_images(&stored).await;
                Err(Error::internal(format!("failed to store listing images: {err}")))
            }
        }
    }

    async fn discard_images(&self, stored: &[StoredMedia]) {
        let deletions = stored.iter().map(|media| self.media.delete(&media.key));
        for (media, result) in stored.iter().zip(join_all(deletions).await) {
            if let Err(err) = result {
                warn!(key = %media.key, error = %err, "failed to remove orphaned image");
            }
        }
    }

    async fn award_claimant(&self, id: &ListingId, claimant: &Username) {
        if let Err(err) = self
            .rewards
            .award_points(claimant, CLAIM_REWARD_POINTS)
            .await
        {
            warn!(
                listing_id = %id,
                claimant = %claimant,
                error = %err,
                "failed to credit claim reward"
            );
        }
    }

    async fn business_selection(
        &self,
        username: &Username,
    ) -> Result<Option<ListingSelection>, Error> {
        let account = self
            .users
            .find_account(username, UserType::Business)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                Error::forbidden("only business accounts can browse by raw materials")
            })?;
        let materials = account.user.profile().raw_materials();
        Ok(WasteTypeSet::try_new(materials)
            .ok()
            .map(ListingSelection::WasteTypes))
    }
}

#[async_trait]
impl ListingCommand for ListingService {
    async fn create_listing(&self, request: CreateListingRequest) -> Result<Listing, Error> {
        let CreateListingRequest {
            owner,
            details,
            coordinates,
            images,
        } = request;

        let stored = self.store_images(&images).await?;
        let draft = ListingDraft {
            owner: owner.username,
            details,
            coordinates,
        };
        let urls = stored.iter().map(|media| media.url.clone()).collect();
        let listing = Listing::create(ListingId::random(), draft, urls, self.clock.utc());

        if let Err(err) = self.listings.insert(&listing).await {
            self.discard_images(&stored).await;
            return Err(map_repository_error(err));
        }

        info!(
            listing_id = %listing.id(),
            owner = %listing.owner(),
            images = listing.image_urls().len(),
            "listing created"
        );
        Ok(listing)
    }

    async fn claim_listing(&self, claimant: &Identity, id: &ListingId) -> Result<Listing, Error> {
        let current = self.load_live(id).await?;
        match current.check_claim(&claimant.username) {
            Err(ClaimRejection::OwnListing) => {
                return Err(Error::forbidden("you cannot claim your own listing"));
            }
            _ if !claimant.user_type.can_claim() => {
                return Err(Error::forbidden(format!(
                    "{} accounts cannot claim listings",
                    claimant.user_type
                )));
            }
            Err(ClaimRejection::NotAvailable(_)) => return Err(already_claimed(id)),
            Ok(()) => {}
        }

        let claimed = match self
            .listings
            .claim_if_available(id, &claimant.username, self.clock.utc())
            .await
            .map_err(map_repository_error)?
        {
            ConditionalWrite::Applied(listing) => listing,
            ConditionalWrite::Rejected(listing) if listing.is_deleted() => {
                return Err(listing_not_found(id));
            }
            ConditionalWrite::Rejected(_) => return Err(already_claimed(id)),
            ConditionalWrite::Missing => return Err(listing_not_found(id)),
        };

        info!(listing_id = %id, claimant = %claimant.username, "listing claimed");
        self.award_claimant(id, &claimant.username).await;
        Ok(claimed)
    }

    async fn update_listing(&self, request: UpdateListingRequest) -> Result<Listing, Error> {
        let UpdateListingRequest {
            requester,
            listing_id,
            patch,
            images,
        } = request;

        let listing = self
            .listings
            .find_by_id(&listing_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| listing_not_found(&listing_id))?;
        match listing.check_update(&requester.username) {
            Err(MutationRejection::NotOwner) => return Err(not_owner("edit")),
            Err(MutationRejection::NotAvailable(status)) => {
                return Err(not_available(&listing_id, status));
            }
            Ok(()) => {}
        }
        if patch.is_empty() && images.is_empty() {
            return Err(Error::invalid_request("update must change at least one field")
                .with_details(json!({ "field": "body", "code": "empty_update" })));
        }

        let stored = self.store_images(&images).await?;
        let urls: Vec<String> = stored.iter().map(|media| media.url.clone()).collect();
        let outcome = match self
            .listings
            .update_if_available(&listing_id, &patch, &urls, self.clock.utc())
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                self.discard_images(&stored).await;
                return Err(map_repository_error(err));
            }
        };
        match outcome {
            ConditionalWrite::Applied(updated) => {
                info!(listing_id = %listing_id, "listing updated");
                Ok(updated)
            }
            ConditionalWrite::Rejected(current) => {
                self.discard_images(&stored).await;
                Err(not_available(&listing_id, current.status()))
            }
            ConditionalWrite::Missing => {
                self.discard_images(&stored).await;
                Err(listing_not_found(&listing_id))
            }
        }
    }

    async fn delete_listing(&self, requester: &Identity, id: &ListingId) -> Result<(), Error> {
        let listing = self
            .listings
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| listing_not_found(id))?;
        match listing.check_delete(&requester.username) {
            Err(MutationRejection::NotOwner) => return Err(not_owner("delete")),
            Err(MutationRejection::NotAvailable(_)) => return Err(listing_not_found(id)),
            Ok(()) => {}
        }

        match self
            .listings
            .soft_delete(id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
        {
            ConditionalWrite::Applied(_) => {
                info!(listing_id = %id, owner = %requester.username, "listing deleted");
                Ok(())
            }
            ConditionalWrite::Rejected(_) | ConditionalWrite::Missing => Err(listing_not_found(id)),
        }
    }
}

#[async_trait]
impl ListingQuery for ListingService {
    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, Error> {
        let selection = match filter {
            ListingFilter::All => ListingSelection::All,
            ListingFilter::Owner(owner) => ListingSelection::Owner(owner),
            ListingFilter::WasteTypes(types) => ListingSelection::WasteTypes(types),
            ListingFilter::Available => ListingSelection::Available,
            ListingFilter::ForBusiness(username) => {
                match self.business_selection(&username).await? {
                    Some(selection) => selection,
                    None => return Ok(Vec::new()),
                }
            }
        };

        self.listings
            .list(&selection)
            .await
            .map_err(map_repository_error)
    }

    async fn get_listing(&self, id: &ListingId) -> Result<Listing, Error> {
        self.load_live(id).await
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
