//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every documented endpoint of the inbound HTTP
//! adapter, the wrapper schemas standing in for domain types, and the
//! bearer token security scheme. The two legacy aliases (`PATCH
//! /listings/claim/{id}` and the multipart `PUT /listings/{id}`) share their
//! canonical operation's documentation and are not listed separately.
//!
//! The document is served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::accounts::{LoginRequest, LoginResponse, SignupRequest};
use crate::inbound::http::listings::ListingUpdateBody;
use crate::inbound::http::media::UploadResponse;
use crate::inbound::http::rewards::RewardStatusResponse;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ListingSchema, ListingStatusSchema, UserSchema, UserTypeSchema,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EcoSwap backend API",
        description = "Waste listing marketplace: accounts, listings, claims, rewards and media."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::list_listings,
        crate::inbound::http::listings::scrap_listings,
        crate::inbound::http::listings::business_listings,
        crate::inbound::http::listings::filter_listings,
        crate::inbound::http::listings::customer_listings,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::claim_listing,
        crate::inbound::http::listings::update_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::rewards::user_score,
        crate::inbound::http::media::upload_photo,
        crate::inbound::http::media::get_media,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ListingSchema,
        ListingStatusSchema,
        UserSchema,
        UserTypeSchema,
        SignupRequest,
        LoginRequest,
        LoginResponse,
        ListingUpdateBody,
        RewardStatusResponse,
        UploadResponse,
    )),
    tags(
        (name = "accounts", description = "Signup and login"),
        (name = "listings", description = "Waste listings and claims"),
        (name = "rewards", description = "Reward points and coupons"),
        (name = "media", description = "Listing photos"),
        (name = "users", description = "Public profiles"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
