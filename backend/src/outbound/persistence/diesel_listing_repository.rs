//! PostgreSQL-backed `ListingRepository`.
//!
//! Conditional transitions are single `UPDATE … WHERE status = … RETURNING`
//! statements. When nothing matches, a follow-up read tells a rejected write
//! apart from a missing row. Edits append images in SQL so concurrent edits
//! never drop each other's URLs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ConditionalWrite, ListingRepository, ListingRepositoryError};
use crate::domain::{
    Coordinates, Listing, ListingDetails, ListingId, ListingPatch, ListingRecord,
    ListingSelection, ListingStatus, Username,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ListingEdit, ListingRow, NewListingRow};
use super::pool::{DbPool, PoolError};
use super::schema::listings;

diesel::define_sql_function!(fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text);
diesel::define_sql_function!(
    fn array_cat(
        head: diesel::sql_types::Array<diesel::sql_types::Text>,
        tail: diesel::sql_types::Array<diesel::sql_types::Text>,
    ) -> diesel::sql_types::Array<diesel::sql_types::Text>
);

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn reclassify(
        &self,
        id: &ListingId,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        Ok(match self.find_by_id(id).await? {
            Some(current) => ConditionalWrite::Rejected(current),
            None => ConditionalWrite::Missing,
        })
    }
}

fn map_pool_error(error: PoolError) -> ListingRepositoryError {
    map_basic_pool_error(error, ListingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_basic_diesel_error(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

fn corrupt(id: Uuid, err: impl std::fmt::Display) -> ListingRepositoryError {
    ListingRepositoryError::query(format!("listing {id} is corrupt: {err}"))
}

/// Convert a database row into a validated domain listing.
fn row_to_listing(row: ListingRow) -> Result<Listing, ListingRepositoryError> {
    let ListingRow {
        id,
        owner,
        waste_type,
        description,
        condition,
        location_name,
        latitude,
        longitude,
        image_urls,
        status,
        claimed_by,
        created_at,
        updated_at,
    } = row;

    let details = ListingDetails::try_new(&waste_type, &description, &condition, &location_name)
        .map_err(|err| corrupt(id, err))?;
    let coordinates = match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            Some(Coordinates::try_new(lat, lon).map_err(|err| corrupt(id, err))?)
        }
        _ => None,
    };
    let record = ListingRecord {
        id: ListingId::from_uuid(id),
        owner: Username::new(&owner).map_err(|err| corrupt(id, err))?,
        details,
        coordinates,
        image_urls,
        status: status
            .parse::<ListingStatus>()
            .map_err(|err| corrupt(id, err))?,
        claimed_by: claimed_by
            .map(Username::new)
            .transpose()
            .map_err(|err| corrupt(id, err))?,
        created_at,
        updated_at,
    };
    Listing::restore(record).map_err(|err| corrupt(id, err))
}

fn rows_to_listings(rows: Vec<ListingRow>) -> Result<Vec<Listing>, ListingRepositoryError> {
    rows.into_iter().map(row_to_listing).collect()
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let details = listing.details();
        let coordinates = listing.coordinates();
        let row = NewListingRow {
            id: *listing.id().as_uuid(),
            owner: listing.owner().as_ref(),
            waste_type: details.waste_type(),
            description: details.description(),
            condition: details.condition(),
            location_name: details.location_name(),
            latitude: coordinates.map(|c| c.latitude()),
            longitude: coordinates.map(|c| c.longitude()),
            image_urls: listing.image_urls(),
            status: listing.status().as_str(),
            claimed_by: listing.claimed_by().map(AsRef::as_ref),
            created_at: listing.created_at(),
            updated_at: listing.updated_at(),
        };

        diesel::insert_into(listings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = listings::table
            .filter(listings::id.eq(id.as_uuid()))
            .select(ListingRow::as_select())
            .first::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_listing).transpose()
    }

    async fn list(
        &self,
        selection: &ListingSelection,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = listings::table
            .filter(listings::status.ne(ListingStatus::Deleted.as_str()))
            .select(ListingRow::as_select())
            .into_boxed();
        query = match selection {
            ListingSelection::All => query,
            ListingSelection::Owner(owner) => query.filter(listings::owner.eq(owner.as_ref())),
            ListingSelection::WasteTypes(types) => {
                let wanted: Vec<String> = types.iter().map(str::to_owned).collect();
                query.filter(lower(listings::waste_type).eq_any(wanted))
            }
            ListingSelection::Available => {
                query.filter(listings::status.eq(ListingStatus::Available.as_str()))
            }
        };

        let rows = query
            .order((listings::created_at.desc(), listings::id.asc()))
            .load::<ListingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_listings(rows)
    }

    async fn claim_if_available(
        &self,
        id: &ListingId,
        claimant: &Username,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let claimed = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(
                listings::table
                    .filter(listings::id.eq(id.as_uuid()))
                    .filter(listings::status.eq(ListingStatus::Available.as_str()))
                    .filter(listings::owner.ne(claimant.as_ref())),
            )
            .set((
                listings::status.eq(ListingStatus::Claimed.as_str()),
                listings::claimed_by.eq(Some(claimant.as_ref())),
                listings::updated_at.eq(now),
            ))
            .returning(ListingRow::as_returning())
            .get_result::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        };

        match claimed {
            Some(row) => row_to_listing(row).map(ConditionalWrite::Applied),
            None => self.reclassify(id).await,
        }
    }

    async fn update_if_available(
        &self,
        id: &ListingId,
        patch: &ListingPatch,
        new_image_urls: &[String],
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let updated = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let edit = ListingEdit::from_patch(patch, now);
            diesel::update(
                listings::table
                    .filter(listings::id.eq(id.as_uuid()))
                    .filter(listings::status.eq(ListingStatus::Available.as_str())),
            )
            .set((
                &edit,
                listings::image_urls.eq(array_cat(listings::image_urls, new_image_urls)),
            ))
            .returning(ListingRow::as_returning())
            .get_result::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        };

        match updated {
            Some(row) => row_to_listing(row).map(ConditionalWrite::Applied),
            None => self.reclassify(id).await,
        }
    }

    async fn soft_delete(
        &self,
        id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<ConditionalWrite, ListingRepositoryError> {
        let deleted = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(
                listings::table
                    .filter(listings::id.eq(id.as_uuid()))
                    .filter(listings::status.ne(ListingStatus::Deleted.as_str())),
            )
            .set((
                listings::status.eq(ListingStatus::Deleted.as_str()),
                listings::updated_at.eq(now),
            ))
            .returning(ListingRow::as_returning())
            .get_result::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        };

        match deleted {
            Some(row) => row_to_listing(row).map(ConditionalWrite::Applied),
            None => self.reclassify(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn row() -> ListingRow {
        let at = Utc
            .with_ymd_and_hms(2024, 8, 1, 9, 0, 0)
            .single()
            .expect("timestamp");
        ListingRow {
            id: Uuid::new_v4(),
            owner: "alice".into(),
            waste_type: "Plastic".into(),
            description: "bottles".into(),
            condition: "clean".into(),
            location_name: "Pune".into(),
            latitude: Some(18.52),
            longitude: Some(73.85),
            image_urls: vec!["/media/a.png".into()],
            status: "available".into(),
            claimed_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn valid_row_becomes_listing(row: ListingRow) {
        let listing = row_to_listing(row).expect("listing");
        assert_eq!(listing.status(), ListingStatus::Available);
        assert_eq!(listing.image_urls(), ["/media/a.png".to_owned()]);
        assert!(listing.coordinates().is_some());
    }

    #[rstest]
    fn legacy_row_without_coordinates_is_accepted(mut row: ListingRow) {
        row.latitude = None;
        row.longitude = None;
        let listing = row_to_listing(row).expect("listing");
        assert_eq!(listing.coordinates(), None);
    }

    #[rstest]
    #[case("claimed", None)]
    #[case("available", Some("bob"))]
    #[case("archived", None)]
    fn inconsistent_rows_are_query_errors(
        mut row: ListingRow,
        #[case] status: &str,
        #[case] claimed_by: Option<&str>,
    ) {
        row.status = status.into();
        row.claimed_by = claimed_by.map(str::to_owned);
        let error = row_to_listing(row).expect_err("corrupt row");
        assert!(matches!(error, ListingRepositoryError::Query { .. }));
    }

    #[rstest]
    fn edit_appends_images_and_skips_absent_fields() {
        let at = Utc
            .with_ymd_and_hms(2024, 8, 1, 10, 0, 0)
            .single()
            .expect("timestamp");
        let patch = ListingPatch::try_new(None, Some("crushed"), None, None).expect("patch");
        let edit = ListingEdit::from_patch(&patch, at);
        let urls = vec!["/media/b.png".to_owned()];
        let query = diesel::update(listings::table.filter(listings::id.eq(Uuid::nil()))).set((
            &edit,
            listings::image_urls.eq(array_cat(listings::image_urls, &urls[..])),
        ));

        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("array_cat("), "{sql}");
        assert!(sql.contains("\"description\" = "), "{sql}");
        assert!(!sql.contains("\"waste_type\" = "), "{sql}");
    }
}
