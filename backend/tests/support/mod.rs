//! Shared harness for backend integration tests.
//!
//! Builds the full HTTP application over the in-memory adapters with a
//! controllable clock. Individual stores can be swapped for failing doubles.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use ecoswap::Trace;
use ecoswap::domain::ports::{
    MediaStore, MediaStoreError, RewardRepository, RewardRepositoryError,
};
use ecoswap::domain::{
    AccountService, ImageUpload, ListingService, MediaKey, MediaObject, MediaService,
    RewardAccount, RewardService, StoredMedia, TokenIdentityResolver, Username,
};
use ecoswap::inbound::http::configure;
use ecoswap::inbound::http::state::{HttpState, HttpStatePorts, UploadLimits};
use ecoswap::outbound::credentials::Argon2PasswordHasher;
use ecoswap::outbound::memory::{
    InMemoryCouponCatalogue, InMemoryListingRepository, InMemoryMediaStore,
    InMemoryRewardRepository, InMemoryUserRepository,
};
use ecoswap::outbound::token::JwtTokenIssuer;
use ecoswap::test_support::MutableClock;

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];
pub const PASSWORD: &str = "secret1";
pub const TOKEN_TTL_SECS: i64 = 60;

const BOUNDARY: &str = "ecoswap-it-boundary";

/// Application state plus handles on the stores tests inspect.
pub struct Harness {
    pub state: web::Data<HttpState>,
    pub media: Arc<InMemoryMediaStore>,
    pub clock: Arc<MutableClock>,
}

/// Builder allowing individual driven stores to be replaced.
pub struct HarnessBuilder {
    media_override: Option<Arc<dyn MediaStore>>,
    rewards_override: Option<Arc<dyn RewardRepository>>,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            media_override: None,
            rewards_override: None,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Application with tracing middleware and every API route.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .configure(configure)
    }
}

impl HarnessBuilder {
    /// Replace the media store; the in-memory store stays inspectable.
    pub fn media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media_override = Some(media);
        self
    }

    pub fn rewards(mut self, rewards: Arc<dyn RewardRepository>) -> Self {
        self.rewards_override = Some(rewards);
        self
    }

    pub fn build(self) -> Harness {
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0)
                .single()
                .expect("fixed start time"),
        ));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let memory_media = Arc::new(InMemoryMediaStore::new("http://media.test"));
        let media: Arc<dyn MediaStore> = self
            .media_override
            .unwrap_or_else(|| memory_media.clone());
        let reward_store: Arc<dyn RewardRepository> = self
            .rewards_override
            .unwrap_or_else(|| Arc::new(InMemoryRewardRepository::new()));
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(
            JwtTokenIssuer::new(b"integration-secret", shared_clock.clone())
                .with_ttl(TimeDelta::seconds(TOKEN_TTL_SECS)),
        );

        let rewards = Arc::new(RewardService::new(
            reward_store,
            Arc::new(InMemoryCouponCatalogue::seeded("http://media.test")),
        ));
        let listings = Arc::new(ListingService::new(
            Arc::new(InMemoryListingRepository::new()),
            users.clone(),
            media.clone(),
            rewards.clone(),
            shared_clock.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            users,
            Arc::new(Argon2PasswordHasher),
            tokens.clone(),
            shared_clock,
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
        Harness {
            state: web::Data::new(HttpState::new(ports, UploadLimits::default())),
            media: memory_media,
            clock,
        }
    }
}

/// Media store delegating to an in-memory store but failing the n-th put.
pub struct FailingNthPut {
    inner: Arc<InMemoryMediaStore>,
    fail_on: usize,
    puts: AtomicUsize,
}

impl FailingNthPut {
    pub fn new(inner: Arc<InMemoryMediaStore>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaStore for FailingNthPut {
    async fn put(
        &self,
        key: &MediaKey,
        image: &ImageUpload,
    ) -> Result<StoredMedia, MediaStoreError> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(MediaStoreError::io("disk full"));
        }
        self.inner.put(key, image).await
    }

    async fn get(&self, key: &MediaKey) -> Result<Option<MediaObject>, MediaStoreError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &MediaKey) -> Result<(), MediaStoreError> {
        self.inner.delete(key).await
    }
}

/// Reward store that is always unreachable.
pub struct UnavailableRewards;

#[async_trait]
impl RewardRepository for UnavailableRewards {
    async fn find(
        &self,
        _username: &Username,
    ) -> Result<Option<RewardAccount>, RewardRepositoryError> {
        Err(RewardRepositoryError::connection("reward store offline"))
    }

    async fn award(
        &self,
        _username: &Username,
        _points: i64,
    ) -> Result<RewardAccount, RewardRepositoryError> {
        Err(RewardRepositoryError::connection("reward store offline"))
    }

    async fn mark_redeemed(
        &self,
        _username: &Username,
        _score: i64,
    ) -> Result<bool, RewardRepositoryError> {
        Err(RewardRepositoryError::connection("reward store offline"))
    }
}

/// Signup body accepted for each role.
pub fn signup_body(user_type: &str, username: &str) -> Value {
    let mut body = json!({
        "type": user_type,
        "username": username,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
        "phone": "9876543210",
        "address": "1 Main St",
    });
    let extra = match user_type {
        "scrap_collector" => json!({
            "fullname": "Sam Collector",
            "city": "Pune",
            "pincode": "411038",
            "scrap_type": "plastic",
            "vehicle": "tempo",
        }),
        "business" => json!({
            "business_name": "Acme Recycling",
            "raw_material": "plastic, glass",
        }),
        _ => json!({}),
    };
    if let (Some(target), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    body
}

/// Multipart body with text fields and `(part, filename, content type, bytes)` files.
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub const LISTING_FORM: &[(&str, &str)] = &[
    ("waste_type", "plastic"),
    ("description", "PET bottles, about 5 kg"),
    ("condition", "good"),
    ("location_name", "Kothrud, Pune"),
    ("latitude", "18.5074"),
    ("longitude", "73.8077"),
];

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Send a request and decode the body as JSON (`Null` when empty).
pub async fn send<S, B>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn signup<S, B>(app: &S, user_type: &str, username: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        test::TestRequest::post()
            .uri("/signup")
            .set_json(signup_body(user_type, username)),
    )
    .await
}

/// Sign up and log in, returning the bearer token.
pub async fn register<S, B>(app: &S, user_type: &str, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = signup(app, user_type, username).await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/login").set_json(json!({
            "username": username,
            "password": PASSWORD,
            "type": user_type,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body.get("token")
        .and_then(Value::as_str)
        .expect("token in login response")
        .to_owned()
}

pub async fn create_listing<S, B>(
    app: &S,
    token: &str,
    files: &[(&str, &str, &str, &[u8])],
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (content_type, body) = multipart_body(LISTING_FORM, files);
    send(
        app,
        test::TestRequest::post()
            .uri("/listings")
            .insert_header(bearer(token))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body),
    )
    .await
}

pub async fn claim<S, B>(app: &S, token: &str, id: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        test::TestRequest::patch()
            .uri(&format!("/listings/{id}/claim"))
            .insert_header(bearer(token)),
    )
    .await
}

pub fn listing_id(listing: &Value) -> String {
    listing
        .get("id")
        .and_then(Value::as_str)
        .expect("listing id")
        .to_owned()
}
