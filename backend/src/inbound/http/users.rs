//! Public profile handler.
//!
//! ```text
//! GET /users/alice
//! GET /users/alice?type=business
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_type, parse_username};

/// Optional role selector for names registered more than once.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProfileQuery {
    /// `customer`, `scrap_collector` or `business`.
    #[serde(rename = "type")]
    #[param(example = "business")]
    pub user_type: Option<String>,
}

/// Public profile of a user. Without `type`, the earliest registration wins.
#[utoipa::path(
    get,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Username"), ProfileQuery),
    responses(
        (status = 200, description = "Profile", body = UserSchema),
        (status = 400, description = "Invalid username or type", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{username}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ProfileQuery>,
) -> ApiResult<web::Json<User>> {
    let username = parse_username(&path, FieldName::new("username"))?;
    let user_type = query
        .user_type
        .as_deref()
        .map(|raw| parse_user_type(raw, FieldName::new("type")))
        .transpose()?;
    state
        .profiles
        .fetch_profile(&username, user_type)
        .await
        .map(web::Json)
}
