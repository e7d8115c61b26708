//! Driving port for account sign-up.

use async_trait::async_trait;

use crate::domain::{AuthenticatedSession, Error, RegistrationDetails};

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Create an account and return it with a fresh bearer token.
    ///
    /// Rejects an email that is already registered with an
    /// `InvalidRequest` error.
    async fn register(&self, details: RegistrationDetails) -> Result<AuthenticatedSession, Error>;
}
