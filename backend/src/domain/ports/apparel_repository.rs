//! Port abstraction for apparel persistence adapters.

use async_trait::async_trait;

use crate::domain::{Apparel, NearbySearch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by apparel repository adapters.
    pub enum ApparelPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "apparel repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "apparel repository query failed: {message}",
    }
}

/// Storage for apparel records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApparelRepository: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, apparel: &Apparel) -> Result<(), ApparelPersistenceError>;

    /// All records owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Apparel>, ApparelPersistenceError>;

    /// Records within the search radius, nearest first, capped at the
    /// search limit.
    async fn find_nearby(
        &self,
        search: &NearbySearch,
    ) -> Result<Vec<Apparel>, ApparelPersistenceError>;
}
