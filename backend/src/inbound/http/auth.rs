//! Bearer token extraction for authenticated handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by resolving the
//! caller's identity here. Handlers take [`Authenticated`] as an argument and
//! receive `401` before their body runs when the token is missing or invalid.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, Identity};

use super::state::HttpState;

const BEARER_PREFIX: &str = "bearer ";

/// Identity of the caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl Authenticated {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    pub fn into_inner(self) -> Identity {
        self.0
    }
}

/// Pull the raw token out of the `Authorization` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?
        .trim();
    let prefix = value
        .get(..BEARER_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX))
        .ok_or_else(|| Error::unauthorized("authorization scheme must be Bearer"))?;
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token"));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not registered"))?;
    let token = bearer_token(req.headers())?;
    let identity = state.identity.resolve(token).inspect_err(|err| {
        debug!(error = %err, "bearer token rejected");
    })?;
    Ok(Authenticated(identity))
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockIdentityResolver;
    use crate::domain::{ErrorCode, UserType, Username};
    use crate::inbound::http::test_utils::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::http::header::HeaderValue;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(value).expect("header value"),
        );
        map
    }

    #[rstest]
    #[case("Bearer abc.def", "abc.def")]
    #[case("bearer   abc.def  ", "abc.def")]
    #[case("BEARER abc", "abc")]
    fn extracts_token(#[case] header: &str, #[case] expected: &str) {
        let map = headers(header);
        assert_eq!(bearer_token(&map).expect("token"), expected);
    }

    #[rstest]
    #[case("Basic YWxpY2U6c2VjcmV0")]
    #[case("Bearer ")]
    #[case("Bear")]
    fn rejects_other_schemes(#[case] header: &str) {
        let error = bearer_token(&headers(header)).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn missing_header_is_unauthorized() {
        let error = bearer_token(&HeaderMap::new()).expect_err("missing");
        assert_eq!(error.message(), "missing bearer token");
    }

    async fn whoami(auth: Authenticated) -> HttpResponse {
        HttpResponse::Ok().body(auth.identity().username.to_string())
    }

    #[actix_web::test]
    async fn resolves_identity_from_state() {
        let mut resolver = MockIdentityResolver::new();
        resolver
            .expect_resolve()
            .withf(|token| token == "good")
            .returning(|_| {
                Ok(Identity {
                    username: Username::new("carol").expect("username"),
                    user_type: UserType::ScrapCollector,
                })
            });
        let mut ports = TestPorts::default();
        ports.identity = resolver;
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_data())
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let ok = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/me")
                .insert_header((AUTHORIZATION, "Bearer good"))
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(ok).await, "carol");

        let anonymous =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }
}
