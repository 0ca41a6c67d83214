//! Account API handlers.
//!
//! ```text
//! POST /signup {"type":"customer","username":"alice","password":"secret1",...}
//! POST /login {"username":"alice","password":"secret1","type":"customer"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    LoginCredentials, LoginValidationError, Registration, RegistrationInput,
    RegistrationValidationError, RoleProfileInput,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{login_validation_error, registration_validation_error};

/// Signup request body for `POST /signup`.
///
/// Role specific fields are optional here and validated against `type`.
/// camelCase keys are canonical; the snake_case spellings of older clients
/// are accepted too.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(rename = "type", alias = "userType", alias = "user_type")]
    #[schema(example = "customer")]
    pub user_type: String,
    #[schema(example = "alice")]
    pub username: String,
    pub password: String,
    #[serde(alias = "confirm_password")]
    pub confirm_password: String,
    #[schema(example = "9876543210")]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub aadhaar: Option<String>,
    #[serde(default, alias = "fullname", alias = "full_name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default, alias = "scrap_type")]
    pub scrap_type: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default, alias = "business_name")]
    pub business_name: Option<String>,
    #[serde(default, alias = "registration_number")]
    pub registration_number: Option<String>,
    #[serde(default, alias = "gst_number")]
    pub gst_number: Option<String>,
    #[serde(default, alias = "business_address")]
    pub business_address: Option<String>,
    #[serde(default, alias = "business_type")]
    pub business_type: Option<String>,
    /// Comma separated list, e.g. `"plastic, glass"`.
    #[serde(default, alias = "raw_material", alias = "raw_materials")]
    pub raw_materials: Option<String>,
    #[serde(default, alias = "rep_name")]
    pub rep_name: Option<String>,
    #[serde(default, alias = "rep_role")]
    pub rep_role: Option<String>,
    #[serde(default, alias = "rep_phone")]
    pub rep_phone: Option<String>,
}

impl TryFrom<SignupRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_input(RegistrationInput {
            user_type: value.user_type,
            username: value.username,
            password: Zeroizing::new(value.password),
            confirm_password: Zeroizing::new(value.confirm_password),
            phone: value.phone,
            email: value.email,
            profile: RoleProfileInput {
                address: value.address,
                aadhaar: value.aadhaar,
                full_name: value.full_name,
                city: value.city,
                pincode: value.pincode,
                scrap_type: value.scrap_type,
                vehicle: value.vehicle,
                business_name: value.business_name,
                registration_number: value.registration_number,
                gst_number: value.gst_number,
                business_address: value.business_address,
                business_type: value.business_type,
                raw_materials: value.raw_materials,
                rep_name: value.rep_name,
                rep_role: value.rep_role,
                rep_phone: value.rep_phone,
            },
        })
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username already registered for this type", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(registration_validation_error)?;
    let user = state.accounts.signup(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login request body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    pub password: String,
    #[serde(rename = "type", alias = "userType", alias = "user_type")]
    #[schema(example = "customer")]
    pub user_type: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password, &value.user_type)
    }
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Role the caller logged in as.
    #[serde(rename = "type")]
    #[schema(example = "customer")]
    pub user_type: String,
    /// HS256 bearer token valid for one hour.
    pub token: String,
}

/// Check credentials and issue a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(login_validation_error)?;
    let outcome = state.accounts.login(credentials).await?;
    Ok(web::Json(LoginResponse {
        user_type: outcome.user_type.as_str().to_owned(),
        token: outcome.token.into(),
    }))
}
