//! Driven port for signed bearer tokens.
//!
//! Tokens are stateless: they cannot be revoked before they expire.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing or verifying tokens.
    pub enum TokenError {
        /// The token could not be signed.
        Issue { message: String } => "token could not be issued: {message}",
        /// The token is malformed, tampered with, or has expired.
        Invalid { message: String } => "token rejected: {message}",
    }
}

/// Issues and verifies bearer tokens bound to a user id.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token whose subject is `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenError>;

    /// Verify a presented token and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
