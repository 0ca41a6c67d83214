//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

#![expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current state of a resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "latitude must be a number between -90 and 90")]
    message: String,
    /// Same text as `message`, kept for older clients.
    #[schema(example = "latitude must be a number between -90 and 90")]
    error: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ListingStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ListingStatus)]
pub enum ListingStatusSchema {
    #[schema(rename = "available")]
    Available,
    #[schema(rename = "claimed")]
    Claimed,
    #[schema(rename = "deleted")]
    Deleted,
}

/// OpenAPI schema for [`crate::domain::Listing`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Listing, rename_all = "camelCase")]
pub struct ListingSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "alice")]
    owner: String,
    #[schema(example = "plastic")]
    waste_type: String,
    #[schema(example = "Clean PET bottles, about 5 kg")]
    description: String,
    #[schema(example = "good")]
    condition: String,
    #[schema(example = "Kothrud, Pune")]
    location_name: String,
    #[schema(example = 18.5074)]
    latitude: Option<f64>,
    #[schema(example = 73.8077)]
    longitude: Option<f64>,
    image_urls: Vec<String>,
    status: ListingStatusSchema,
    claimed_by: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::UserType`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserType)]
pub enum UserTypeSchema {
    #[schema(rename = "customer")]
    Customer,
    #[schema(rename = "scrap_collector")]
    ScrapCollector,
    #[schema(rename = "business")]
    Business,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Public profile; role specific fields are present only for their role.
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(example = "alice")]
    username: String,
    #[schema(rename = "type")]
    user_type: UserTypeSchema,
    #[schema(example = "9876543210")]
    phone: String,
    email: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    address: Option<String>,
    aadhaar: Option<String>,
    full_name: Option<String>,
    city: Option<String>,
    pincode: Option<String>,
    scrap_type: Option<String>,
    vehicle: Option<String>,
    business_name: Option<String>,
    raw_materials: Option<Vec<String>>,
    registration_number: Option<String>,
    gst_number: Option<String>,
    business_address: Option<String>,
    business_type: Option<String>,
    rep_name: Option<String>,
    rep_role: Option<String>,
    rep_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_wire_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "camelCase trace id");
        assert!(schema_json.contains("\"error\""), "legacy error field");
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn listing_schema_has_claim_fields() {
        let schema_json = schema_to_json::<ListingSchema>();
        assert_eq!(ListingSchema::name(), "crate.domain.Listing");
        assert!(schema_json.contains("claimedBy"));
        assert!(schema_json.contains("imageUrls"));
    }

    #[test]
    fn user_schema_exposes_type_field() {
        let schema_json = schema_to_json::<UserSchema>();
        assert!(schema_json.contains("\"type\""));
        assert!(!schema_json.contains("password"));
    }
}
