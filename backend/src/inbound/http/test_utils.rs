//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;
use actix_web::web;

use crate::domain::ports::{
    MockAccountCommand, MockIdentityResolver, MockListingCommand, MockListingQuery,
    MockMediaLibrary, MockRewardQuery, MockUserProfileQuery,
};
use crate::domain::{Identity, UserType, Username};

use super::state::{HttpState, HttpStatePorts, UploadLimits};

/// Token accepted by [`TestPorts::authenticating`].
pub const TEST_TOKEN: &str = "test-token";

/// Mock for every driving port; configure the ones a test needs.
#[derive(Default)]
pub struct TestPorts {
    pub listings: MockListingCommand,
    pub listings_query: MockListingQuery,
    pub rewards: MockRewardQuery,
    pub accounts: MockAccountCommand,
    pub profiles: MockUserProfileQuery,
    pub media: MockMediaLibrary,
    pub identity: MockIdentityResolver,
    pub limits: UploadLimits,
}

impl TestPorts {
    /// Resolve [`TEST_TOKEN`] to `username` acting as `user_type`.
    pub fn authenticating(username: &str, user_type: UserType) -> Self {
        let identity = Identity {
            username: Username::new(username).expect("fixture username"),
            user_type,
        };
        let mut ports = Self::default();
        ports
            .identity
            .expect_resolve()
            .withf(|token| token == TEST_TOKEN)
            .returning(move |_| Ok(identity.clone()));
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                listings: Arc::new(self.listings),
                listings_query: Arc::new(self.listings_query),
                rewards: Arc::new(self.rewards),
                accounts: Arc::new(self.accounts),
                profiles: Arc::new(self.profiles),
                media: Arc::new(self.media),
                identity: Arc::new(self.identity),
            },
            self.limits,
        )
    }

    pub fn into_data(self) -> web::Data<HttpState> {
        web::Data::new(self.into_state())
    }
}

/// Attach the test bearer token to a request.
pub fn with_token(request: TestRequest) -> TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {TEST_TOKEN}")))
}

/// Build a `multipart/form-data` body from text fields and files.
///
/// Files are `(field, filename, content_type, bytes)`.
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "ecoswap-test-boundary";
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
