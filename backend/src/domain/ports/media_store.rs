//! Port for durable image storage.

use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaKey, MediaObject, StoredMedia};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// Reading or writing the backing storage failed.
        Io { message: String } => "media store i/o failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `image` under `key` and return its public location.
    async fn put(&self, key: &MediaKey, image: &ImageUpload)
    -> Result<StoredMedia, MediaStoreError>;

    /// Read an object back; `None` when absent.
    async fn get(&self, key: &MediaKey) -> Result<Option<MediaObject>, MediaStoreError>;

    /// Remove an object. Removing a missing object succeeds.
    async fn delete(&self, key: &MediaKey) -> Result<(), MediaStoreError>;
}
