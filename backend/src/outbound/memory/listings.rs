//! In-memory `ListingRepository`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::listing::sort_newest_first;
use crate::domain::ports::{ConditionalWrite, ListingRepository, ListingRepositoryError};
use crate::domain::{Listing, ListingId, ListingPatch, ListingSelection, Username};

use super::lock;

/// Listing store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryListingRepository {
    listings: Mutex<HashMap<ListingId, Listing>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut listings = lock(&self.listings, ListingRepositoryError::query)?;
        if listings.contains_key(&listing.id()) {
            return Err(ListingRepositoryError::query(format!(
                "listing {} already exists",
                listing.id()
            )));
        }
        listings.insert(listing.id(), listing.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let listings = lock(&self.listings, ListingRepositoryError::query)?;
        Ok(listings.get(id).cloned())
    }

    async fn list(
        &self,
        selection: &ListingSelection,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let listings = lock(&self.listings, ListingRepositoryError::query)?;
        let mut selected: Vec<Listing> = listings
            .values()
            .filter(|listing| selection.matches(listing))
            .cloned()
            .collect();
        drop(listings);
        sort_newest_first(&mut selected);
        Ok(selected)
    }

    async fn claim_if_available(
        &self,
        id: &ListingId,
        claimant: &Username,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let mut listings = lock(&self.listings, ListingRepositoryError::query)?;
        let Some(stored) = listings.get_mut(id) else {
            return Ok(ConditionalWrite::Missing);
        };
        match stored.claim(claimant, now) {
            Ok(()) => Ok(ConditionalWrite::Applied(stored.clone())),
            Err(_) => Ok(ConditionalWrite::Rejected(stored.clone())),
        }
    }

    async fn update_if_available(
        &self,
        id: &ListingId,
        patch: &ListingPatch,
        new_image_urls: &[String],
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let mut listings = lock(&self.listings, ListingRepositoryError::query)?;
        let Some(stored) = listings.get_mut(id) else {
            return Ok(ConditionalWrite::Missing);
        };
        let owner = stored.owner().clone();
        match stored.apply_patch(&owner, patch.clone(), new_image_urls.to_vec(), now) {
            Ok(()) => Ok(ConditionalWrite::Applied(stored.clone())),
            Err(_) => Ok(ConditionalWrite::Rejected(stored.clone())),
        }
    }

    async fn soft_delete(
        &self,
        id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let mut listings = lock(&self.listings, ListingRepositoryError::query)?;
        let Some(stored) = listings.get_mut(id) else {
            return Ok(ConditionalWrite::Missing);
        };
        let owner = stored.owner().clone();
        match stored.mark_deleted(&owner, now) {
            Ok(()) => Ok(ConditionalWrite::Applied(stored.clone())),
            Err(_) => Ok(ConditionalWrite::Rejected(stored.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Coordinates, ListingDetails, ListingDraft, ListingStatus};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, hour, 0, 0)
            .single()
            .expect("timestamp")
    }

    fn user(name: &str) -> Username {
        Username::new(name).expect("username")
    }

    fn listing(owner: &str, waste_type: &str, hour: u32) -> Listing {
        let draft = ListingDraft {
            owner: user(owner),
            details: ListingDetails::try_new(waste_type, "bag of bottles", "clean", "Pune")
                .expect("details"),
            coordinates: Coordinates::try_new(18.52, 73.85).expect("coordinates"),
        };
        Listing::create(ListingId::random(), draft, Vec::new(), at(hour))
    }

    #[fixture]
    fn repo() -> Arc<InMemoryListingRepository> {
        Arc::new(InMemoryListingRepository::new())
    }

    #[rstest]
    #[tokio::test]
    async fn lists_newest_first_and_hides_deleted(repo: Arc<InMemoryListingRepository>) {
        let older = listing("alice", "plastic", 8);
        let newer = listing("alice", "glass", 9);
        let gone = listing("alice", "metal", 10);
        for item in [&older, &newer, &gone] {
            repo.insert(item).await.expect("insert");
        }
        repo.soft_delete(&gone.id(), at(11)).await.expect("delete");

        let all = repo.list(&ListingSelection::All).await.expect("list");
        let ids: Vec<ListingId> = all.iter().map(Listing::id).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn second_claim_is_rejected(repo: Arc<InMemoryListingRepository>) {
        let item = listing("alice", "plastic", 8);
        repo.insert(&item).await.expect("insert");

        let first = repo
            .claim_if_available(&item.id(), &user("bob"), at(9))
            .await
            .expect("claim");
        let second = repo
            .claim_if_available(&item.id(), &user("carol"), at(9))
            .await
            .expect("claim");

        let ConditionalWrite::Applied(claimed) = first else {
            panic!("first claim should apply");
        };
        assert_eq!(claimed.claimed_by(), Some(&user("bob")));
        let ConditionalWrite::Rejected(current) = second else {
            panic!("second claim should be rejected");
        };
        assert_eq!(current.claimed_by(), Some(&user("bob")));
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_claims_have_one_winner(repo: Arc<InMemoryListingRepository>) {
        let item = listing("alice", "plastic", 8);
        repo.insert(&item).await.expect("insert");

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let repo = Arc::clone(&repo);
                let id = item.id();
                tokio::spawn(async move {
                    repo.claim_if_available(&id, &user(&format!("collector{n}")), at(9))
                        .await
                })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            let outcome = handle.await.expect("join").expect("claim");
            if matches!(outcome, ConditionalWrite::Applied(_)) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_claimed_listing_is_rejected(repo: Arc<InMemoryListingRepository>) {
        let item = listing("alice", "plastic", 8);
        repo.insert(&item).await.expect("insert");
        repo.claim_if_available(&item.id(), &user("bob"), at(9))
            .await
            .expect("claim");

        let outcome = repo
            .update_if_available(&item.id(), &ListingPatch::default(), &[], at(10))
            .await
            .expect("update");
        assert!(matches!(outcome, ConditionalWrite::Rejected(ref l) if l.status() == ListingStatus::Claimed));
    }

    #[rstest]
    #[tokio::test]
    async fn interleaved_edits_keep_both_image_sets(repo: Arc<InMemoryListingRepository>) {
        let item = listing("alice", "plastic", 8);
        repo.insert(&item).await.expect("insert");
        let description =
            ListingPatch::try_new(None, Some("crushed"), None, None).expect("patch");
        let condition = ListingPatch::try_new(None, None, Some("dirty"), None).expect("patch");

        repo.update_if_available(&item.id(), &description, &["a.png".to_owned()], at(9))
            .await
            .expect("first edit");
        let outcome = repo
            .update_if_available(&item.id(), &condition, &["b.png".to_owned()], at(9))
            .await
            .expect("second edit");

        let ConditionalWrite::Applied(stored) = outcome else {
            panic!("second edit should apply");
        };
        assert_eq!(stored.image_urls(), ["a.png", "b.png"]);
        assert_eq!(stored.details().description(), "crushed");
        assert_eq!(stored.details().condition(), "dirty");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_listing_reports_missing(repo: Arc<InMemoryListingRepository>) {
        let outcome = repo
            .soft_delete(&ListingId::random(), at(9))
            .await
            .expect("delete");
        assert_eq!(outcome, ConditionalWrite::Missing);
    }
}
