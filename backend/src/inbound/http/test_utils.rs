//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{
    MockApparelQuery, MockApparelSubmission, MockLoginService, MockUserProfileQuery,
    MockUserRegistration, TokenError, TokenService,
};
use crate::domain::{AccessToken, UserId};

use super::state::HttpState;

/// Bearer token accepted by [`StaticTokens`].
pub const VALID_TOKEN: &str = "valid";

/// Token service accepting only [`VALID_TOKEN`], always for the same user.
#[derive(Debug, Clone, Copy)]
pub struct StaticTokens;

impl StaticTokens {
    pub fn subject() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x3fa8_5f64_5717_4562_b3fc_2c96_3f66_afa6))
    }
}

impl TokenService for StaticTokens {
    fn issue(&self, _user_id: &UserId) -> Result<AccessToken, TokenError> {
        Ok(AccessToken::new(VALID_TOKEN))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        if token == VALID_TOKEN {
            Ok(Self::subject())
        } else {
            Err(TokenError::invalid("unknown token"))
        }
    }
}

/// Mocked driving ports. Unconfigured mocks panic when called.
#[derive(Default)]
pub struct TestPorts {
    pub registration: MockUserRegistration,
    pub login: MockLoginService,
    pub profile: MockUserProfileQuery,
    pub submission: MockApparelSubmission,
    pub apparel: MockApparelQuery,
}

impl TestPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            registration: Arc::new(self.registration),
            login: Arc::new(self.login),
            profile: Arc::new(self.profile),
            submission: Arc::new(self.submission),
            apparel: Arc::new(self.apparel),
            tokens: Arc::new(StaticTokens),
        }
    }
}

/// State with untouched mocks and the given token service.
pub fn state_with_tokens(tokens: impl TokenService + 'static) -> HttpState {
    HttpState {
        tokens: Arc::new(tokens),
        ..TestPorts::default().into_state()
    }
}

/// `Authorization` header value for [`VALID_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {VALID_TOKEN}"))
}
