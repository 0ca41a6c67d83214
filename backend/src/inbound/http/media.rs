//! Media API handlers: standalone photo upload and image reads.
//!
//! ```text
//! POST /upload-photo   multipart: photo (or image / file)  -> 201 {"url": "..."}
//! GET  /media/{key}    image bytes with a content hash ETag
//! ```

use actix_multipart::Multipart;
use actix_web::http::header::{self, EntityTag, IfNoneMatch};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::domain::{Error, MediaKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::multipart::read_form;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::{HttpState, UploadLimits};
use crate::inbound::http::validation::{FieldName, missing_field_error};

const PHOTO_PARTS: &[&str] = &["photo", "image", "file"];
const PHOTO: FieldName = FieldName::new("photo");

/// Stored keys are never reused, so responses may be cached indefinitely.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Location of an uploaded photo.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "http://localhost:8080/media/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub url: String,
}

/// Upload a single photo and return its public URL.
#[utoipa::path(
    post,
    path = "/upload-photo",
    request_body(content_type = "multipart/form-data", description = "One image file under `photo`"),
    responses(
        (status = 201, description = "Photo stored", body = UploadResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 500, description = "Media store failure", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "uploadPhoto",
    security(("BearerToken" = []))
)]
#[post("/upload-photo")]
pub async fn upload_photo(
    state: web::Data<HttpState>,
    _auth: Authenticated,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let limits = UploadLimits {
        max_images: 1,
        ..state.limits
    };
    let form = read_form(payload, PHOTO_PARTS, PHOTO, limits).await?;
    let image = form
        .into_images()
        .into_iter()
        .next()
        .ok_or_else(|| missing_field_error(PHOTO))?;
    let stored = state.media.upload(image).await?;
    Ok(HttpResponse::Created().json(UploadResponse { url: stored.url }))
}

fn etag_for(bytes: &[u8]) -> EntityTag {
    EntityTag::new_strong(hex::encode(Sha256::digest(bytes)))
}

fn not_modified(req: &HttpRequest, etag: &EntityTag) -> bool {
    match req.get_header::<IfNoneMatch>() {
        Some(IfNoneMatch::Any) => true,
        Some(IfNoneMatch::Items(tags)) => tags.iter().any(|tag| tag.weak_eq(etag)),
        None => false,
    }
}

/// Stored image bytes.
#[utoipa::path(
    get,
    path = "/media/{key}",
    params(("key" = String, Path, description = "Media key, e.g. `<uuid>.png`")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 304, description = "Client copy is current"),
        (status = 400, description = "Malformed key", body = ErrorSchema),
        (status = 404, description = "No such image", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "getMedia",
    security([])
)]
#[get("/media/{key}")]
pub async fn get_media(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = MediaKey::new(path.into_inner()).map_err(|_| Error::not_found("media not found"))?;
    let object = state.media.fetch(&key).await?;
    let etag = etag_for(&object.bytes);

    if not_modified(&req, &etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header(header::ETag(etag))
            .finish());
    }
    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header(header::ETag(etag))
        .insert_header((header::CACHE_CONTROL, IMMUTABLE))
        .body(object.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImageFormat, MediaObject, StoredMedia, UserType};
    use crate::inbound::http::test_utils::{TestPorts, multipart_body, with_token};
    use actix_web::http::StatusCode;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 9, 9];

    #[actix_web::test]
    async fn upload_returns_created_url() {
        let mut ports = TestPorts::authenticating("alice", UserType::Customer);
        ports
            .media
            .expect_upload()
            .withf(|image| image.format() == ImageFormat::Jpeg)
            .times(1)
            .return_once(|_| {
                let key = MediaKey::new("abc.jpg").expect("key");
                Ok(StoredMedia {
                    url: format!("http://media.test/media/{key}"),
                    key,
                })
            });
        let app = actix_test::init_service(
            App::new().app_data(ports.into_data()).service(upload_photo),
        )
        .await;
        let (content_type, body) =
            multipart_body(&[], &[("photo", "me.jpg", "image/jpeg", JPEG)]);

        let response = actix_test::call_service(
            &app,
            with_token(
                actix_test::TestRequest::post()
                    .uri("/upload-photo")
                    .insert_header((CONTENT_TYPE, content_type))
                    .set_payload(body),
            )
            .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("url").and_then(Value::as_str),
            Some("http://media.test/media/abc.jpg")
        );
    }

    #[actix_web::test]
    async fn upload_without_photo_is_bad_request() {
        let mut ports = TestPorts::authenticating("alice", UserType::Customer);
        ports.media.expect_upload().times(0);
        let app = actix_test::init_service(
            App::new().app_data(ports.into_data()).service(upload_photo),
        )
        .await;
        let (content_type, body) = multipart_body(&[("caption", "hello")], &[]);

        let response = actix_test::call_service(
            &app,
            with_token(
                actix_test::TestRequest::post()
                    .uri("/upload-photo")
                    .insert_header((CONTENT_TYPE, content_type))
                    .set_payload(body),
            )
            .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/field").and_then(Value::as_str),
            Some("photo")
        );
    }

    fn fetching_ports() -> TestPorts {
        let mut ports = TestPorts::default();
        ports.media.expect_fetch().returning(|key| {
            if key.as_ref() == "abc.png" {
                Ok(MediaObject {
                    content_type: "image/png",
                    bytes: vec![1, 2, 3],
                })
            } else {
                Err(Error::not_found(format!("media {key} not found")))
            }
        });
        ports
    }

    #[actix_web::test]
    async fn serves_bytes_with_etag_and_honours_if_none_match() {
        let app = actix_test::init_service(
            App::new()
                .app_data(fetching_ports().into_data())
                .service(get_media),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/media/abc.png").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("image/png")
        );
        let etag = response
            .headers()
            .get(header::ETAG)
            .expect("etag")
            .clone();
        assert_eq!(actix_test::read_body(response).await.as_ref(), &[1, 2, 3]);

        let revalidated = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/media/abc.png")
                .insert_header((header::IF_NONE_MATCH, etag))
                .to_request(),
        )
        .await;
        assert_eq!(revalidated.status(), StatusCode::NOT_MODIFIED);
    }

    #[actix_web::test]
    async fn unknown_key_is_not_found() {
        let app = actix_test::init_service(
            App::new()
                .app_data(fetching_ports().into_data())
                .service(get_media),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/media/zzz.png").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
