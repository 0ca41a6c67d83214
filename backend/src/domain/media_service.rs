//! Media domain service for standalone uploads and image reads.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{MediaLibrary, MediaStore, MediaStoreError};
use crate::domain::{Error, ImageUpload, MediaKey, MediaObject, StoredMedia};

fn map_store_error(error: MediaStoreError) -> Error {
    Error::internal(error.to_string())
}

/// Media service implementing [`MediaLibrary`].
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
}

impl MediaService {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MediaLibrary for MediaService {
    async fn upload(&self, image: ImageUpload) -> Result<StoredMedia, Error> {
        let key = MediaKey::generate(image.format());
        let stored = self
            .store
            .put(&key, &image)
            .await
            .map_err(map_store_error)?;
        info!(key = %stored.key, bytes = image.bytes().len(), "image uploaded");
        Ok(stored)
    }

    async fn fetch(&self, key: &MediaKey) -> Result<MediaObject, Error> {
        self.store
            .get(key)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("media {key} not found")))
    }
}
