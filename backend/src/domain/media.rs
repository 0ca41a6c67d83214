//! Image objects held by the media store.

use std::fmt;

use uuid::Uuid;

/// Longest accepted media key.
pub const MEDIA_KEY_MAX: usize = 128;

/// Validation errors for uploads and media keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaValidationError {
    #[error("image must not be empty")]
    EmptyImage,
    #[error("image exceeds the {max} byte limit")]
    TooLarge { max: usize },
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },
    #[error("invalid media key")]
    InvalidKey,
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Map an `image/*` content type onto a format.
    pub fn from_content_type(content_type: &str) -> Result<Self, MediaValidationError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(Self::Jpeg),
            "image/gif" => Ok(Self::Gif),
            "image/webp" => Ok(Self::Webp),
            _ => Err(MediaValidationError::UnsupportedContentType {
                content_type: content_type.to_owned(),
            }),
        }
    }

    /// Recover the format from a stored key's extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Name of an object in the media store.
///
/// ## Invariants
/// - 1..=[`MEDIA_KEY_MAX`] characters from `[A-Za-z0-9._-]`.
/// - Does not start with `.` so keys never name hidden files or `..`.
///
/// # Examples
/// ```
/// use ecoswap::domain::MediaKey;
///
/// let key = MediaKey::from_url("http://localhost:8080/media/abc.png").unwrap();
/// assert_eq!(key.as_ref(), "abc.png");
/// assert!(MediaKey::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey(String);

impl MediaKey {
    pub fn new(value: impl Into<String>) -> Result<Self, MediaValidationError> {
        let value = value.into();
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if value.is_empty() || value.len() > MEDIA_KEY_MAX || !valid_chars || value.starts_with('.')
        {
            return Err(MediaValidationError::InvalidKey);
        }
        Ok(Self(value))
    }

    /// Mint a unique key for an image of the given format.
    pub fn generate(format: ImageFormat) -> Self {
        Self(format!("{}.{}", Uuid::new_v4().simple(), format.extension()))
    }

    /// Extract the key from a public media URL (its last path segment).
    pub fn from_url(url: &str) -> Result<Self, MediaValidationError> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        Self::new(segment)
    }

    /// Image format implied by the key's extension.
    pub fn format(&self) -> Option<ImageFormat> {
        self.0
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext))
    }
}

impl AsRef<str> for MediaKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated image bytes ready for storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an upload against the size limit and content type.
    pub fn try_new(
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, MediaValidationError> {
        if bytes.is_empty() {
            return Err(MediaValidationError::EmptyImage);
        }
        if bytes.len() > max_bytes {
            return Err(MediaValidationError::TooLarge { max: max_bytes });
        }
        let format = ImageFormat::from_content_type(content_type)?;
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub key: MediaKey,
    pub url: String,
}

/// Object bytes read back from the store.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaObject {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MediaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaObject")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
