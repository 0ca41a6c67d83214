//! Filesystem-backed media store.
//!
//! Objects live as flat files inside one capability-scoped directory. Keys
//! are validated by [`MediaKey`], so they can never name a path outside it.
//! Writes land in a dot-prefixed scratch file first and are renamed into
//! place, which keeps readers from observing half-written images.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageFormat, ImageUpload, MediaKey, MediaObject, StoredMedia};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// [`MediaStore`] writing into a local directory through `cap_std`.
#[derive(Clone)]
pub struct FsMediaStore {
    dir: Arc<Dir>,
    public_base_url: String,
}

impl FsMediaStore {
    /// Open (creating if needed) the media directory at `root`.
    ///
    /// # Errors
    /// Returns [`io::Error`] when the directory cannot be created or opened.
    pub fn open(root: &Path, public_base_url: impl Into<String>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url_for(&self, key: &MediaKey) -> String {
        format!("{}/media/{key}", self.public_base_url)
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, MediaStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| MediaStoreError::io(format!("media task failed: {err}")))?
            .map_err(|err| MediaStoreError::io(err.to_string()))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn put(
        &self,
        key: &MediaKey,
        image: &ImageUpload,
    ) -> Result<StoredMedia, MediaStoreError> {
        let name = key.to_string();
        let scratch = format!(".{name}.partial");
        let bytes = image.bytes().to_vec();
        self.blocking(move |dir| {
            dir.write(&scratch, &bytes)?;
            dir.rename(&scratch, dir, &name)
        })
        .await?;
        debug!(%key, "media object written");
        Ok(StoredMedia {
            key: key.clone(),
            url: self.url_for(key),
        })
    }

    async fn get(&self, key: &MediaKey) -> Result<Option<MediaObject>, MediaStoreError> {
        let name = key.to_string();
        let bytes = self
            .blocking(move |dir| match dir.read(&name) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err),
            })
            .await?;
        Ok(bytes.map(|bytes| MediaObject {
            content_type: key
                .format()
                .map(ImageFormat::content_type)
                .unwrap_or(FALLBACK_CONTENT_TYPE),
            bytes,
        }))
    }

    async fn delete(&self, key: &MediaKey) -> Result<(), MediaStoreError> {
        let name = key.to_string();
        self.blocking(move |dir| match dir.remove_file(&name) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        })
        .await
    }
}
