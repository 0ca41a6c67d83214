//! Driving port for standalone media uploads and reads.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, MediaKey, MediaObject, StoredMedia};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Store an image under a fresh key.
    async fn upload(&self, image: ImageUpload) -> Result<StoredMedia, Error>;

    /// Read a stored image.
    async fn fetch(&self, key: &MediaKey) -> Result<MediaObject, Error>;
}
