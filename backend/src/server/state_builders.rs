//! Builders wiring driven adapters into the domain services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use ecoswap::domain::ports::{
    CouponCatalogue, ListingRepository, MediaStore, RewardRepository, UserRepository,
};
use ecoswap::domain::{
    AccountService, ListingService, MediaService, RewardService, TokenIdentityResolver,
};
use ecoswap::inbound::http::state::{HttpState, HttpStatePorts};
use ecoswap::outbound::credentials::Argon2PasswordHasher;
use ecoswap::outbound::media::FsMediaStore;
use ecoswap::outbound::memory::{
    InMemoryCouponCatalogue, InMemoryListingRepository, InMemoryRewardRepository,
    InMemoryUserRepository,
};
use ecoswap::outbound::persistence::{
    DbPool, DieselCouponCatalogue, DieselListingRepository, DieselRewardRepository,
    DieselUserRepository,
};
use ecoswap::outbound::token::JwtTokenIssuer;
use tracing::{info, warn};

use super::ServerConfig;

/// Driven stores shared by the services.
struct Stores {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
    rewards: Arc<dyn RewardRepository>,
    coupons: Arc<dyn CouponCatalogue>,
}

fn diesel_stores(pool: &DbPool) -> Stores {
    Stores {
        listings: Arc::new(DieselListingRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        rewards: Arc::new(DieselRewardRepository::new(pool.clone())),
        coupons: Arc::new(DieselCouponCatalogue::new(pool.clone())),
    }
}

fn memory_stores(public_base_url: &str) -> Stores {
    Stores {
        listings: Arc::new(InMemoryListingRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
        rewards: Arc::new(InMemoryRewardRepository::new()),
        coupons: Arc::new(InMemoryCouponCatalogue::seeded(public_base_url)),
    }
}

/// Build HTTP state from the configured adapters.
///
/// PostgreSQL repositories are used when a pool is configured; otherwise
/// every store lives in memory and is lost on restart. Media always goes to
/// the configured directory.
///
/// # Errors
/// Returns [`std::io::Error`] when the media directory cannot be opened.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let stores = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL stores");
            diesel_stores(pool)
        }
        None => {
            warn!("no database configured; using in-memory stores");
            memory_stores(&config.public_base_url)
        }
    };
    let media: Arc<dyn MediaStore> = Arc::new(FsMediaStore::open(
        &config.media_dir,
        config.public_base_url.as_str(),
    )?);
    info!(dir = %config.media_dir.display(), "media store ready");

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenIssuer::new(&config.jwt_secret, Arc::clone(&clock)));
    let rewards = Arc::new(RewardService::new(stores.rewards, stores.coupons));
    let listings = Arc::new(ListingService::new(
        stores.listings,
        Arc::clone(&stores.users),
        Arc::clone(&media),
        rewards.clone(),
        Arc::clone(&clock),
    ));
    let accounts = Arc::new(AccountService::new(
        stores.users,
        Arc::new(Argon2PasswordHasher),
        tokens.clone(),
        clock,
    ));

    let ports = HttpStatePorts {
        listings: listings.clone(),
        listings_query: listings,
        rewards,
        accounts: accounts.clone(),
        profiles: accounts,
        media: Arc::new(MediaService::new(media)),
        identity: Arc::new(TokenIdentityResolver::new(tokens)),
    };
    Ok(web::Data::new(HttpState::new(ports, config.limits)))
}
