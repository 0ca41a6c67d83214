//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. One row per `(username, user_type)`.
    users (username, user_type) {
        username -> Varchar,
        /// `customer`, `scrap_collector` or `business`.
        user_type -> Varchar,
        phone -> Text,
        email -> Nullable<Text>,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Role profile serialised as tagged JSON.
        profile -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Waste listings, soft deleted via `status = 'deleted'`.
    listings (id) {
        id -> Uuid,
        owner -> Varchar,
        waste_type -> Text,
        description -> Text,
        condition -> Text,
        location_name -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        image_urls -> Array<Text>,
        status -> Varchar,
        claimed_by -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reward ledger keyed by username.
    rewards (username) {
        username -> Varchar,
        score -> Int8,
        /// Score at the last coupon redemption.
        redeemed_points -> Int8,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Coupon images grouped by category.
    coupons (id) {
        id -> Uuid,
        category -> Varchar,
        image_url -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, listings, rewards, coupons);
