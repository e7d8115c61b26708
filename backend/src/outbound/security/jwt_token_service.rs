//! HS256 JSON Web Token implementation of the `TokenService` port.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, UserId};

/// Default token lifetime in days.
pub const DEFAULT_TOKEN_TTL_DAYS: u32 = 30;

/// Registered claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service from the signing secret and token lifetime.
    pub fn new(secret: Zeroizing<String>, ttl_days: u32, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(i64::from(ttl_days)),
            clock,
        }
    }

    fn claims_for(&self, user_id: &UserId) -> Claims {
        let issued_at = self.clock.utc();
        Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        }
    }

    /// Decode and validate a token, returning its claims.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenError::invalid(err.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            &self.claims_for(user_id),
            &self.encoding_key,
        )
        .map(AccessToken::new)
        .map_err(|err| TokenError::issue(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.decode_claims(token)?;
        UserId::new(&claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
