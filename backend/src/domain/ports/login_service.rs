//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{AuthenticatedSession, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the user with a fresh bearer token.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// `Unauthorized`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error>;
}
