//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`configure`] registers every marketplace route; the server and the
//! integration tests share it so route precedence is tested as deployed.

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod listings;
pub mod media;
mod multipart;
pub mod rewards;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    validation::malformed_body_error(format!("invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    validation::malformed_body_error(format!("invalid query string: {err}")).into()
}

/// Register the API routes and request body configuration.
///
/// Fixed segments such as `/listings/scrap` are registered before
/// `/listings/{id}` so they are not captured as identifiers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(accounts::signup)
        .service(accounts::login)
        .service(listings::create_listing)
        .service(listings::list_listings)
        .service(listings::scrap_listings)
        .service(listings::business_listings)
        .service(listings::filter_listings)
        .service(listings::customer_listings)
        .service(listings::claim_listing_legacy)
        .service(listings::get_listing)
        .service(listings::claim_listing)
        .service(listings::update_listing_with_images)
        .service(listings::update_listing)
        .service(listings::delete_listing)
        .service(rewards::user_score)
        .service(media::upload_photo)
        .service(media::get_media)
        .service(users::get_user);
}
