//! Multipart form reading for listing and photo uploads.
//!
//! Text parts are collected by name; file parts become validated
//! [`ImageUpload`]s. Oversized parts are rejected while streaming so a large
//! upload is refused before it is buffered.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::StreamExt;

use crate::domain::{Error, ImageUpload, MediaValidationError};

use super::state::UploadLimits;
use super::validation::{FieldName, image_validation_error, malformed_body_error};

/// Upper bound for a single text part.
const MAX_TEXT_BYTES: usize = 16 * 1024;

fn malformed_part(err: MultipartError) -> Error {
    malformed_body_error(format!("malformed multipart body: {err}"))
}

/// Parsed multipart form.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    text: HashMap<String, String>,
    images: Vec<ImageUpload>,
}

impl UploadForm {
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub(crate) fn into_images(self) -> Vec<ImageUpload> {
        self.images
    }
}

/// Read a multipart body, treating parts named in `image_fields` as images.
///
/// File parts with neither a filename nor content are skipped.
pub(crate) async fn read_form(
    mut payload: Multipart,
    image_fields: &[&str],
    images_field: FieldName,
    limits: UploadLimits,
) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(part) = payload.next().await {
        let mut field = part.map_err(malformed_part)?;
        let name = field.name().unwrap_or_default().to_owned();
        if image_fields.contains(&name.as_str()) {
            let index = form.images.len();
            let content_type = field
                .content_type()
                .map(|mime| mime.essence_str().to_owned())
                .unwrap_or_default();
            let unnamed = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .is_none_or(str::is_empty);
            let bytes = read_bytes(&mut field, limits.max_image_bytes, || {
                image_validation_error(
                    images_field,
                    index,
                    MediaValidationError::TooLarge {
                        max: limits.max_image_bytes,
                    },
                )
            })
            .await?;
            // An untouched file input still submits an unnamed, empty part.
            if unnamed && bytes.is_empty() {
                continue;
            }
            if index >= limits.max_images {
                return Err(malformed_body_error(format!(
                    "at most {} images may be uploaded",
                    limits.max_images
                )));
            }
            let image = ImageUpload::try_new(&content_type, bytes, limits.max_image_bytes)
                .map_err(|err| image_validation_error(images_field, index, err))?;
            form.images.push(image);
        } else {
            let bytes = read_bytes(&mut field, MAX_TEXT_BYTES, || {
                malformed_body_error(format!("{name} exceeds {MAX_TEXT_BYTES} bytes"))
            })
            .await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| malformed_body_error(format!("{name} must be UTF-8 text")))?;
            form.text.insert(name, value);
        }
    }
    Ok(form)
}

async fn read_bytes(
    field: &mut Field,
    cap: usize,
    too_large: impl FnOnce() -> Error,
) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed_part)?;
        if bytes.len() + chunk.len() > cap {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
