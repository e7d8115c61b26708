//! Identity domain service: registration, login and profile lookup.
//!
//! Implements the `UserRegistration`, `LoginService` and `UserProfileQuery`
//! driving ports over the user repository, password hasher, token service
//! and notifier.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, Notifier, PasswordHashError, PasswordHasher, TokenError, TokenService,
    UserPersistenceError, UserProfileQuery, UserRegistration, UserRepository,
};
use crate::domain::{
    AuthenticatedSession, EmailAddress, EmailNotification, Error, LoginCredentials,
    RegistrationDetails, User, UserAccount, UserId,
};

pub(crate) const DUPLICATE_EMAIL_MESSAGE: &str = "User already exists";
pub(crate) const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub(crate) const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Identity service implementing the account driving ports.
#[derive(Clone)]
pub struct IdentityService<R, H, T, N> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<R, H, T, N> IdentityService<R, H, T, N> {
    /// Create a new service from its collaborators.
    pub fn new(
        users: Arc<R>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            notifier,
            clock,
        }
    }
}

impl<R, H, T, N> IdentityService<R, H, T, N>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    N: Notifier,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::DuplicateEmail { .. } => {
                Error::invalid_request(DUPLICATE_EMAIL_MESSAGE)
            }
            UserPersistenceError::Connection { message } => {
                Error::internal(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn map_token_error(error: TokenError) -> Error {
        Error::internal(error.to_string())
    }

    fn session_for(&self, user: User) -> Result<AuthenticatedSession, Error> {
        let token = self
            .tokens
            .issue(user.id())
            .map_err(Self::map_token_error)?;
        Ok(AuthenticatedSession { user, token })
    }

    /// Reject a login for an unknown email only after verifying against the
    /// hasher's decoy digest, so the response time matches a wrong password.
    async fn reject_unknown_account(&self, password: &str) -> Error {
        let decoy = self.hasher.decoy_digest();
        if let Err(error) = self.hasher.verify(password, &decoy).await {
            warn!(%error, "decoy password verification failed");
        }
        Error::unauthorized(INVALID_CREDENTIALS_MESSAGE)
    }

    async fn send_welcome(&self, user: &User) {
        let notification = EmailNotification::welcome(user);
        if let Err(error) = self.notifier.send(&notification).await {
            warn!(user_id = %user.id(), %error, "welcome email failed");
        }
    }
}

#[async_trait]
impl<R, H, T, N> UserRegistration for IdentityService<R, H, T, N>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    N: Notifier,
{
    async fn register(&self, details: RegistrationDetails) -> Result<AuthenticatedSession, Error> {
        let existing = self
            .users
            .find_by_email(details.email())
            .await
            .map_err(Self::map_user_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request(DUPLICATE_EMAIL_MESSAGE));
        }

        let password_digest = self
            .hasher
            .hash(details.password())
            .await
            .map_err(Self::map_hash_error)?;
        let user = User::register(
            UserId::random(),
            details.username().clone(),
            details.email().clone(),
            self.clock.utc(),
        );
        let account = UserAccount {
            user,
            password_digest,
        };
        // The unique index still guards against a concurrent sign-up racing
        // past the lookup above.
        self.users
            .insert(&account)
            .await
            .map_err(Self::map_user_error)?;

        info!(user_id = %account.user.id(), "user registered");
        self.send_welcome(&account.user).await;
        self.session_for(account.user)
    }
}

#[async_trait]
impl<R, H, T, N> LoginService for IdentityService<R, H, T, N>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    N: Notifier,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(self.reject_unknown_account(credentials.password()).await);
        };
        let Some(account) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(self.reject_unknown_account(credentials.password()).await);
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &account.password_digest)
            .await
            .map_err(Self::map_hash_error)?;
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }

        self.session_for(account.user)
    }
}

#[async_trait]
impl<R, H, T, N> UserProfileQuery for IdentityService<R, H, T, N>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    N: Notifier,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
