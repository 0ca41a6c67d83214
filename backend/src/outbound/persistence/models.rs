//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! into validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ListingPatch;

use super::schema::{coupons, listings, rewards, users};

/// Row read from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub username: String,
    pub user_type: String,
    pub phone: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable user account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub user_type: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub profile: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Row read from the listings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub owner: String,
    pub waste_type: String,
    pub description: String,
    pub condition: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_urls: Vec<String>,
    pub status: String,
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable listing.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub owner: &'a str,
    pub waste_type: &'a str,
    pub description: &'a str,
    pub condition: &'a str,
    pub location_name: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_urls: &'a [String],
    pub status: &'a str,
    pub claimed_by: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner-editable listing columns; `None` leaves a column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
pub(crate) struct ListingEdit<'a> {
    pub waste_type: Option<&'a str>,
    pub description: Option<&'a str>,
    pub condition: Option<&'a str>,
    pub location_name: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ListingEdit<'a> {
    pub(crate) fn from_patch(patch: &'a ListingPatch, now: DateTime<Utc>) -> Self {
        Self {
            waste_type: patch.waste_type(),
            description: patch.description(),
            condition: patch.condition(),
            location_name: patch.location_name(),
            updated_at: now,
        }
    }
}

/// Row read from the rewards table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rewards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RewardRow {
    pub username: String,
    pub score: i64,
    pub redeemed_points: i64,
}

/// Insertable reward ledger entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rewards)]
pub(crate) struct NewRewardRow<'a> {
    pub username: &'a str,
    pub score: i64,
    pub redeemed_points: i64,
}

/// Row read from the coupons table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub image_url: String,
}
