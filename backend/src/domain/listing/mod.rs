//! Waste listing aggregate.
//!
//! A listing is created `available`, may be claimed exactly once by someone
//! other than its owner, and can be soft deleted by its owner. Mutable text
//! fields only change while the listing is still available.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Username;

/// Validation errors for listing values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingValidationError {
    /// A required text field was missing or blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// Latitude was not a finite number in `[-90, 90]`.
    #[error("latitude must be a number between -90 and 90")]
    InvalidLatitude,
    /// Longitude was not a finite number in `[-180, 180]`.
    #[error("longitude must be a number between -180 and 180")]
    InvalidLongitude,
    /// A patch carried no changes.
    #[error("update must change at least one field")]
    EmptyPatch,
    /// No usable waste types were supplied to a filter.
    #[error("at least one waste type is required")]
    NoWasteTypes,
    /// Status string was not recognised.
    #[error("unknown listing status: {value}")]
    UnknownStatus { value: String },
    /// A stored record broke the claim invariant.
    #[error("listing {status} record has inconsistent claimant")]
    InconsistentClaim { status: ListingStatus },
}

impl ListingValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::InvalidLatitude => "latitude",
            Self::InvalidLongitude => "longitude",
            Self::EmptyPatch => "body",
            Self::NoWasteTypes => "waste_types",
            Self::UnknownStatus { .. } | Self::InconsistentClaim { .. } => "status",
        }
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ListingValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ListingValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Opaque listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    Claimed,
    Deleted,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Claimed => "claimed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ListingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "claimed" => Ok(Self::Claimed),
            "deleted" => Ok(Self::Deleted),
            other => Err(ListingValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// WGS84 position of a pickup location.
///
/// # Examples
/// ```
/// use ecoswap::domain::Coordinates;
///
/// assert!(Coordinates::try_new(18.52, 73.85).is_ok());
/// assert!(Coordinates::try_new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, ListingValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ListingValidationError::InvalidLatitude);
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ListingValidationError::InvalidLongitude);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse textual form fields, reporting the offending one.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, ListingValidationError> {
        let latitude = latitude
            .trim()
            .parse::<f64>()
            .map_err(|_| ListingValidationError::InvalidLatitude)?;
        let longitude = longitude
            .trim()
            .parse::<f64>()
            .map_err(|_| ListingValidationError::InvalidLongitude)?;
        Self::try_new(latitude, longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Descriptive text of a listing.
///
/// ## Invariants
/// - Every field is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    waste_type: String,
    description: String,
    condition: String,
    location_name: String,
}

impl ListingDetails {
    pub fn try_new(
        waste_type: &str,
        description: &str,
        condition: &str,
        location_name: &str,
    ) -> Result<Self, ListingValidationError> {
        Ok(Self {
            waste_type: non_empty("waste_type", waste_type)?,
            description: non_empty("description", description)?,
            condition: non_empty("condition", condition)?,
            location_name: non_empty("location_name", location_name)?,
        })
    }

    pub fn waste_type(&self) -> &str {
        &self.waste_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }
}

/// Validated attributes for a new listing, before images are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub owner: Username,
    pub details: ListingDetails,
    pub coordinates: Coordinates,
}

/// Partial update of a listing's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    waste_type: Option<String>,
    description: Option<String>,
    condition: Option<String>,
    location_name: Option<String>,
}

impl ListingPatch {
    /// Validate optional fields; present fields must be non-empty.
    pub fn try_new(
        waste_type: Option<&str>,
        description: Option<&str>,
        condition: Option<&str>,
        location_name: Option<&str>,
    ) -> Result<Self, ListingValidationError> {
        let check = |field: &'static str, value: Option<&str>| {
            value.map(|v| non_empty(field, v)).transpose()
        };
        Ok(Self {
            waste_type: check("waste_type", waste_type)?,
            description: check("description", description)?,
            condition: check("condition", condition)?,
            location_name: check("location_name", location_name)?,
        })
    }

    pub fn waste_type(&self) -> Option<&str> {
        self.waste_type.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location_name.as_deref()
    }

    /// Whether the patch changes no text field.
    pub fn is_empty(&self) -> bool {
        self.waste_type.is_none()
            && self.description.is_none()
            && self.condition.is_none()
            && self.location_name.is_none()
    }
}

/// Persisted field values used to rebuild a [`Listing`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: ListingId,
    pub owner: Username,
    pub details: ListingDetails,
    pub coordinates: Option<Coordinates>,
    pub image_urls: Vec<String>,
    pub status: ListingStatus,
    pub claimed_by: Option<Username>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a claim attempt was refused by the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRejection {
    /// The claimant owns the listing.
    OwnListing,
    /// The listing is no longer available.
    NotAvailable(ListingStatus),
}

/// Why an owner mutation was refused by the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRejection {
    /// The requester is not the owner.
    NotOwner,
    /// The listing is no longer available for this change.
    NotAvailable(ListingStatus),
}

/// Waste listing.
///
/// ## Invariants
/// - `claimed_by` is set exactly when `status` is `claimed`; a deleted
///   listing keeps whichever claimant it had.
/// - `updated_at` is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    id: ListingId,
    owner: Username,
    #[serde(flatten)]
    details: ListingDetails,
    latitude: Option<f64>,
    longitude: Option<f64>,
    image_urls: Vec<String>,
    status: ListingStatus,
    claimed_by: Option<Username>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build a fresh `available` listing.
    pub fn create(
        id: ListingId,
        draft: ListingDraft,
        image_urls: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let ListingDraft {
            owner,
            details,
            coordinates,
        } = draft;
        Self {
            id,
            owner,
            details,
            latitude: Some(coordinates.latitude()),
            longitude: Some(coordinates.longitude()),
            image_urls,
            status: ListingStatus::Available,
            claimed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a listing from storage, enforcing the claim invariant.
    pub fn restore(record: ListingRecord) -> Result<Self, ListingValidationError> {
        let consistent = match record.status {
            ListingStatus::Available => record.claimed_by.is_none(),
            ListingStatus::Claimed => record.claimed_by.is_some(),
            ListingStatus::Deleted => true,
        };
        if !consistent {
            return Err(ListingValidationError::InconsistentClaim {
                status: record.status,
            });
        }
        Ok(Self {
            id: record.id,
            owner: record.owner,
            details: record.details,
            latitude: record.coordinates.map(|c| c.latitude()),
            longitude: record.coordinates.map(|c| c.longitude()),
            image_urls: record.image_urls,
            status: record.status,
            claimed_by: record.claimed_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn owner(&self) -> &Username {
        &self.owner
    }

    pub fn details(&self) -> &ListingDetails {
        &self.details
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::try_new(lat, lon).ok(),
            _ => None,
        }
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn claimed_by(&self) -> Option<&Username> {
        self.claimed_by.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, username: &Username) -> bool {
        &self.owner == username
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ListingStatus::Deleted
    }

    /// Whether `claimant` may claim the listing right now.
    pub fn check_claim(&self, claimant: &Username) -> Result<(), ClaimRejection> {
        if self.is_owned_by(claimant) {
            return Err(ClaimRejection::OwnListing);
        }
        if self.status != ListingStatus::Available {
            return Err(ClaimRejection::NotAvailable(self.status));
        }
        Ok(())
    }

    /// Transition `available → claimed`.
    pub fn claim(&mut self, claimant: &Username, now: DateTime<Utc>) -> Result<(), ClaimRejection> {
        self.check_claim(claimant)?;
        self.status = ListingStatus::Claimed;
        self.claimed_by = Some(claimant.clone());
        self.touch(now);
        Ok(())
    }

    /// Whether `requester` may edit the listing right now.
    pub fn check_update(&self, requester: &Username) -> Result<(), MutationRejection> {
        if !self.is_owned_by(requester) {
            return Err(MutationRejection::NotOwner);
        }
        if self.status != ListingStatus::Available {
            return Err(MutationRejection::NotAvailable(self.status));
        }
        Ok(())
    }

    /// Apply a patch and append new image URLs.
    pub fn apply_patch(
        &mut self,
        requester: &Username,
        patch: ListingPatch,
        new_image_urls: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<(), MutationRejection> {
        self.check_update(requester)?;
        let ListingPatch {
            waste_type,
            description,
            condition,
            location_name,
        } = patch;
        if let Some(value) = waste_type {
            self.details.waste_type = value;
        }
        if let Some(value) = description {
            self.details.description = value;
        }
        if let Some(value) = condition {
            self.details.condition = value;
        }
        if let Some(value) = location_name {
            self.details.location_name = value;
        }
        self.image_urls.extend(new_image_urls);
        self.touch(now);
        Ok(())
    }

    /// Whether `requester` may delete the listing right now.
    pub fn check_delete(&self, requester: &Username) -> Result<(), MutationRejection> {
        if !self.is_owned_by(requester) {
            return Err(MutationRejection::NotOwner);
        }
        if self.is_deleted() {
            return Err(MutationRejection::NotAvailable(self.status));
        }
        Ok(())
    }

    /// Soft delete the listing.
    pub fn mark_deleted(
        &mut self,
        requester: &Username,
        now: DateTime<Utc>,
    ) -> Result<(), MutationRejection> {
        self.check_delete(requester)?;
        self.status = ListingStatus::Deleted;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Normalised set of waste types used for filtering.
///
/// Entries are trimmed and lower-cased so matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasteTypeSet(BTreeSet<String>);

impl WasteTypeSet {
    pub fn try_new<I, S>(types: I) -> Result<Self, ListingValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = types
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if set.is_empty() {
            return Err(ListingValidationError::NoWasteTypes);
        }
        Ok(Self(set))
    }

    /// Parse a comma separated query value such as `plastic,metal`.
    pub fn parse_csv(value: &str) -> Result<Self, ListingValidationError> {
        Self::try_new(value.split(','))
    }

    pub fn contains(&self, waste_type: &str) -> bool {
        self.0.contains(&waste_type.trim().to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Listing queries offered to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    /// Every non-deleted listing.
    All,
    /// Non-deleted listings owned by a user.
    Owner(Username),
    /// Non-deleted listings whose waste type is in the set.
    WasteTypes(WasteTypeSet),
    /// Listings still open for claiming.
    Available,
    /// Listings matching a business user's raw materials.
    ForBusiness(Username),
}

/// Store-level selection a repository can evaluate directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSelection {
    All,
    Owner(Username),
    WasteTypes(WasteTypeSet),
    Available,
}

impl ListingSelection {
    /// Evaluate the selection against a listing in memory.
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.is_deleted() {
            return false;
        }
        match self {
            Self::All => true,
            Self::Owner(owner) => listing.is_owned_by(owner),
            Self::WasteTypes(types) => types.contains(listing.details().waste_type()),
            Self::Available => listing.status() == ListingStatus::Available,
        }
    }
}

/// Order listings newest first, breaking ties by identifier.
pub fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}
