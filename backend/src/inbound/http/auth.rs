//! Bearer-token extraction for protected handlers.
//!
//! `AuthenticatedUser` reads `Authorization: Bearer <token>` and verifies it
//! through the `TokenService` held in [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, UserId};

use super::state::HttpState;

pub(crate) const MISSING_TOKEN_MESSAGE: &str = "Not authorised, no token";
pub(crate) const INVALID_TOKEN_MESSAGE: &str = "Not authorised, token failed";

/// Identity of the caller, proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized(MISSING_TOKEN_MESSAGE))?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    state
        .tokens
        .verify(token)
        .map(AuthenticatedUser)
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized(INVALID_TOKEN_MESSAGE)
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TokenError;
    use crate::inbound::http::test_utils::{StaticTokens, state_with_tokens};
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn request(header: Option<&str>) -> HttpRequest {
        let mut builder =
            TestRequest::default().app_data(web::Data::new(state_with_tokens(StaticTokens)));
        if let Some(value) = header {
            builder = builder.insert_header((AUTHORIZATION, value));
        }
        builder.to_http_request()
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer    "))]
    fn missing_bearer_token_is_rejected(#[case] header: Option<&str>) {
        let error = authenticate(&request(header)).expect_err("no token");
        assert_eq!(error.message(), MISSING_TOKEN_MESSAGE);
    }

    #[rstest]
    fn invalid_token_is_rejected() {
        let error = authenticate(&request(Some("Bearer forged"))).expect_err("bad token");
        assert_eq!(error.message(), INVALID_TOKEN_MESSAGE);
    }

    #[rstest]
    #[case("Bearer valid")]
    #[case("bearer valid")]
    fn valid_token_yields_the_subject(#[case] header: &str) {
        let user = authenticate(&request(Some(header))).expect("authenticated");
        assert_eq!(user.id(), &StaticTokens::subject());
    }

    #[rstest]
    fn static_tokens_reject_anything_else() {
        assert!(matches!(
            crate::domain::ports::TokenService::verify(&StaticTokens, "other"),
            Err(TokenError::Invalid { .. })
        ));
    }
}
