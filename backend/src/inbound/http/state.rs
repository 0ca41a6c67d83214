//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, IdentityResolver, ListingCommand, ListingQuery, MediaLibrary, RewardQuery,
    UserProfileQuery,
};

/// Default per-image size limit: 5 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Default number of images accepted on one listing request.
pub const DEFAULT_MAX_IMAGES: usize = 10;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub listings: Arc<dyn ListingCommand>,
    pub listings_query: Arc<dyn ListingQuery>,
    pub rewards: Arc<dyn RewardQuery>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub media: Arc<dyn MediaLibrary>,
    pub identity: Arc<dyn IdentityResolver>,
}

/// Upload limits applied while reading multipart bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_image_bytes: usize,
    pub max_images: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_images: DEFAULT_MAX_IMAGES,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<dyn ListingCommand>,
    pub listings_query: Arc<dyn ListingQuery>,
    pub rewards: Arc<dyn RewardQuery>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub media: Arc<dyn MediaLibrary>,
    pub identity: Arc<dyn IdentityResolver>,
    pub limits: UploadLimits,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, UploadLimits::default())
    }
}

impl HttpState {
    /// Construct state from a ports bundle and upload limits.
    pub fn new(ports: HttpStatePorts, limits: UploadLimits) -> Self {
        let HttpStatePorts {
            listings,
            listings_query,
            rewards,
            accounts,
            profiles,
            media,
            identity,
        } = ports;
        Self {
            listings,
            listings_query,
            rewards,
            accounts,
            profiles,
            media,
            identity,
            limits,
        }
    }
}
