//! Driving port for apparel listings.

use async_trait::async_trait;

use crate::domain::{Apparel, Error, NearbySearch, UserId};

/// Domain use-case port for reading apparel records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApparelQuery: Send + Sync {
    /// Records owned by `owner`, newest first.
    async fn list_owned(&self, owner: &UserId) -> Result<Vec<Apparel>, Error>;

    /// Records within the search radius, nearest first.
    async fn nearby(&self, search: &NearbySearch) -> Result<Vec<Apparel>, Error>;
}
