//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, RewardOutcome, RewardPolicy, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Storage for user accounts and their reward state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the address is
    /// already registered.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch an account, including its password digest, by email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Atomically apply one submission's reward to the user.
    ///
    /// Implementations must increment points and append the milestone badge
    /// in a single conditional update so concurrent submissions cannot lose
    /// points or grant the badge twice. Returns `None` when the user does not
    /// exist.
    async fn apply_submission_reward(
        &self,
        id: &UserId,
        policy: &RewardPolicy,
    ) -> Result<Option<RewardOutcome>, UserPersistenceError>;
}
