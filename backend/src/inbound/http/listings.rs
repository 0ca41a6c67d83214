//! Listing API handlers.
//!
//! ```text
//! POST   /listings                 multipart: waste_type, description, condition,
//!                                  location_name, latitude, longitude, images[]
//! GET    /listings                 every live listing
//! GET    /listings/scrap           listings still open for claiming
//! GET    /listings/business        listings matching the caller's raw materials
//! GET    /listings/filter?waste_types=plastic,glass
//! GET    /listings/customer/{username}
//! GET    /listings/{id}
//! PATCH  /listings/{id}/claim
//! PUT    /listings/{id}            JSON patch, or multipart with extra images
//! DELETE /listings/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::guard::GuardContext;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateListingRequest, UpdateListingRequest};
use crate::domain::{
    Coordinates, Error, Identity, Listing, ListingDetails, ListingFilter, ListingId,
    ListingPatch, WasteTypeSet,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::multipart::{UploadForm, read_form};
use crate::inbound::http::schemas::{ErrorSchema, ListingSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, listing_validation_error, missing_fields_error, parse_listing_id, parse_username,
};

const IMAGE_PARTS: &[&str] = &["images", "images[]", "image"];
const IMAGES: FieldName = FieldName::new("images");
const LISTING_ID: FieldName = FieldName::new("id");

/// Multipart text fields, each with the spellings clients send.
const WASTE_TYPE: (FieldName, &[&str]) = (FieldName::new("waste_type"), &["waste_type", "wasteType"]);
const DESCRIPTION: (FieldName, &[&str]) = (FieldName::new("description"), &["description"]);
const CONDITION: (FieldName, &[&str]) = (FieldName::new("condition"), &["condition"]);
const LOCATION_NAME: (FieldName, &[&str]) = (
    FieldName::new("location_name"),
    &["location_name", "locationName"],
);
const LATITUDE: (FieldName, &[&str]) = (FieldName::new("latitude"), &["latitude"]);
const LONGITUDE: (FieldName, &[&str]) = (FieldName::new("longitude"), &["longitude"]);

fn form_text<'a>(form: &'a UploadForm, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| form.text(name))
}

fn create_request(owner: Identity, form: UploadForm) -> Result<CreateListingRequest, Error> {
    let required = [WASTE_TYPE, DESCRIPTION, CONDITION, LOCATION_NAME, LATITUDE, LONGITUDE];
    let values = required.map(|(_, names)| form_text(&form, names));
    let missing: Vec<FieldName> = required
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|((field, _), _)| *field)
        .collect();
    let [
        Some(waste_type),
        Some(description),
        Some(condition),
        Some(location_name),
        Some(latitude),
        Some(longitude),
    ] = values
    else {
        return Err(missing_fields_error(&missing));
    };

    let details = ListingDetails::try_new(waste_type, description, condition, location_name)
        .map_err(listing_validation_error)?;
    let coordinates = Coordinates::parse(latitude, longitude).map_err(listing_validation_error)?;
    Ok(CreateListingRequest {
        owner,
        details,
        coordinates,
        images: form.into_images(),
    })
}

/// Create a listing from a multipart form.
#[utoipa::path(
    post,
    path = "/listings",
    request_body(
        content_type = "multipart/form-data",
        description = "Text fields waste_type, description, condition, location_name, latitude, longitude and zero or more image files under `images`"
    ),
    responses(
        (status = 201, description = "Listing created", body = ListingSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 500, description = "Image upload or store failure", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "createListing",
    security(("BearerToken" = []))
)]
#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = read_form(payload, IMAGE_PARTS, IMAGES, state.limits).await?;
    let request = create_request(auth.into_inner(), form)?;
    let listing = state.listings.create_listing(request).await?;
    Ok(HttpResponse::Created().json(listing))
}

async fn list(state: &HttpState, filter: ListingFilter) -> ApiResult<web::Json<Vec<Listing>>> {
    state
        .listings_query
        .list_listings(filter)
        .await
        .map(web::Json)
}

/// Every live listing, newest first.
#[utoipa::path(
    get,
    path = "/listings",
    responses(
        (status = 200, description = "Listings", body = [ListingSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "listListings",
    security([])
)]
#[get("/listings")]
pub async fn list_listings(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Listing>>> {
    list(&state, ListingFilter::All).await
}

/// Listings still available for claiming; the scrap collector feed.
#[utoipa::path(
    get,
    path = "/listings/scrap",
    responses(
        (status = 200, description = "Available listings", body = [ListingSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "listAvailableListings",
    security([])
)]
#[get("/listings/scrap")]
pub async fn scrap_listings(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Listing>>> {
    list(&state, ListingFilter::Available).await
}

/// Listings whose waste type is one of the calling business's raw materials.
#[utoipa::path(
    get,
    path = "/listings/business",
    responses(
        (status = 200, description = "Matching listings", body = [ListingSchema]),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Caller is not a business", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "listBusinessListings",
    security(("BearerToken" = []))
)]
#[get("/listings/business")]
pub async fn business_listings(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<Listing>>> {
    let identity = auth.into_inner();
    list(&state, ListingFilter::ForBusiness(identity.username)).await
}

/// Query string for `GET /listings/filter`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct WasteTypeQuery {
    /// Comma separated waste types, matched case-insensitively.
    #[param(example = "plastic,glass")]
    pub waste_types: Option<String>,
}

/// Listings whose waste type matches any of `waste_types`.
#[utoipa::path(
    get,
    path = "/listings/filter",
    params(WasteTypeQuery),
    responses(
        (status = 200, description = "Matching listings", body = [ListingSchema]),
        (status = 400, description = "No waste types given", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "filterListings",
    security([])
)]
#[get("/listings/filter")]
pub async fn filter_listings(
    state: web::Data<HttpState>,
    query: web::Query<WasteTypeQuery>,
) -> ApiResult<web::Json<Vec<Listing>>> {
    let types = WasteTypeSet::parse_csv(query.waste_types.as_deref().unwrap_or_default())
        .map_err(listing_validation_error)?;
    list(&state, ListingFilter::WasteTypes(types)).await
}

/// Live listings created by `username`.
#[utoipa::path(
    get,
    path = "/listings/customer/{username}",
    params(("username" = String, Path, description = "Listing owner")),
    responses(
        (status = 200, description = "Owned listings", body = [ListingSchema]),
        (status = 400, description = "Invalid username", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "listOwnedListings",
    security([])
)]
#[get("/listings/customer/{username}")]
pub async fn customer_listings(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Listing>>> {
    let owner = parse_username(&path, FieldName::new("username"))?;
    list(&state, ListingFilter::Owner(owner)).await
}

/// A single live listing.
#[utoipa::path(
    get,
    path = "/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier (UUID)")),
    responses(
        (status = 200, description = "Listing", body = ListingSchema),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "getListing",
    security([])
)]
#[get("/listings/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Listing>> {
    let id = parse_listing_id(&path, LISTING_ID)?;
    state.listings_query.get_listing(&id).await.map(web::Json)
}

async fn claim(state: &HttpState, auth: Authenticated, raw_id: &str) -> ApiResult<web::Json<Listing>> {
    let id = parse_listing_id(raw_id, LISTING_ID)?;
    state
        .listings
        .claim_listing(auth.identity(), &id)
        .await
        .map(web::Json)
}

/// Claim a listing for the caller.
///
/// Only scrap collectors and businesses claim, never their own listing. The
/// claimant earns reward points.
#[utoipa::path(
    patch,
    path = "/listings/{id}/claim",
    params(("id" = String, Path, description = "Listing identifier (UUID)")),
    responses(
        (status = 200, description = "Claimed listing", body = ListingSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Own listing or customer account", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema),
        (status = 409, description = "Listing already claimed", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "claimListing",
    security(("BearerToken" = []))
)]
#[patch("/listings/{id}/claim")]
pub async fn claim_listing(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Listing>> {
    claim(&state, auth, &path).await
}

/// Older clients claim via `/listings/claim/{id}`; any body is ignored
/// because the claimant always comes from the token.
#[patch("/listings/claim/{id}")]
pub async fn claim_listing_legacy(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Listing>> {
    claim(&state, auth, &path).await
}

/// JSON body for `PUT /listings/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdateBody {
    #[serde(default, alias = "waste_type")]
    pub waste_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default, alias = "location_name")]
    pub location_name: Option<String>,
}

impl TryFrom<ListingUpdateBody> for ListingPatch {
    type Error = Error;

    fn try_from(value: ListingUpdateBody) -> Result<Self, Self::Error> {
        ListingPatch::try_new(
            value.waste_type.as_deref(),
            value.description.as_deref(),
            value.condition.as_deref(),
            value.location_name.as_deref(),
        )
        .map_err(listing_validation_error)
    }
}

/// Edit an available listing owned by the caller.
///
/// Send `multipart/form-data` instead of JSON to append images.
#[utoipa::path(
    put,
    path = "/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier (UUID)")),
    request_body = ListingUpdateBody,
    responses(
        (status = 200, description = "Updated listing", body = ListingSchema),
        (status = 400, description = "Invalid or empty patch", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Caller does not own the listing", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema),
        (status = 409, description = "Listing is claimed or deleted", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "updateListing",
    security(("BearerToken" = []))
)]
#[put("/listings/{id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<ListingUpdateBody>,
) -> ApiResult<web::Json<Listing>> {
    let listing_id = parse_listing_id(&path, LISTING_ID)?;
    let patch = ListingPatch::try_from(payload.into_inner())?;
    state
        .listings
        .update_listing(UpdateListingRequest {
            requester: auth.into_inner(),
            listing_id,
            patch,
            images: Vec::new(),
        })
        .await
        .map(web::Json)
}

fn is_multipart(ctx: &GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Multipart flavour of [`update_listing`] that can append images.
#[put("/listings/{id}", guard = "is_multipart")]
pub async fn update_listing_with_images(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<Listing>> {
    let listing_id = parse_listing_id(&path, LISTING_ID)?;
    let form = read_form(payload, IMAGE_PARTS, IMAGES, state.limits).await?;
    let patch = ListingPatch::try_new(
        form_text(&form, WASTE_TYPE.1),
        form_text(&form, DESCRIPTION.1),
        form_text(&form, CONDITION.1),
        form_text(&form, LOCATION_NAME.1),
    )
    .map_err(listing_validation_error)?;
    state
        .listings
        .update_listing(UpdateListingRequest {
            requester: auth.into_inner(),
            listing_id,
            patch,
            images: form.into_images(),
        })
        .await
        .map(web::Json)
}

/// Soft delete a listing owned by the caller.
#[utoipa::path(
    delete,
    path = "/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier (UUID)")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Caller does not own the listing", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "deleteListing",
    security(("BearerToken" = []))
)]
#[delete("/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: ListingId = parse_listing_id(&path, LISTING_ID)?;
    state.listings.delete_listing(auth.identity(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
