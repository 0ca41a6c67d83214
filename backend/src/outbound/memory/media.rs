//! In-memory `MediaStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageUpload, MediaKey, MediaObject, StoredMedia};

use super::lock;

/// Image blobs held in process memory, addressed under `public_base_url`.
#[derive(Debug)]
pub struct InMemoryMediaStore {
    public_base_url: String,
    objects: Mutex<HashMap<MediaKey, MediaObject>>,
}

impl InMemoryMediaStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
            objects: Mutex::default(),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(
        &self,
        key: &MediaKey,
        image: &ImageUpload,
    ) -> Result<StoredMedia, MediaStoreError> {
        let object = MediaObject {
            content_type: image.format().content_type(),
            bytes: image.bytes().to_vec(),
        };
        lock(&self.objects, MediaStoreError::io)?.insert(key.clone(), object);
        Ok(StoredMedia {
            key: key.clone(),
            url: format!("{}/media/{key}", self.public_base_url),
        })
    }

    async fn get(&self, key: &MediaKey) -> Result<Option<MediaObject>, MediaStoreError> {
        Ok(lock(&self.objects, MediaStoreError::io)?.get(key).cloned())
    }

    async fn delete(&self, key: &MediaKey) -> Result<(), MediaStoreError> {
        lock(&self.objects, MediaStoreError::io)?.remove(key);
        Ok(())
    }
}
