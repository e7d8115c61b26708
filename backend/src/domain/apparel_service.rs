//! Apparel domain service: submissions and listings.
//!
//! A submission runs three steps in order: upload the image, persist the
//! record, then reward the submitter. Steps are not rolled back when a later
//! one fails, so a failed insert can leave an orphaned object behind.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ApparelPersistenceError, ApparelQuery, ApparelRepository, ApparelSubmission,
    ApparelSubmissionRequest, ImageStore, Notifier, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Apparel, ApparelId, EmailNotification, Error, NearbySearch, RewardOutcome, RewardPolicy,
    UserId,
};

/// Apparel service implementing the submission and query driving ports.
#[derive(Clone)]
pub struct ApparelService<A, U, I, N> {
    apparel: Arc<A>,
    users: Arc<U>,
    images: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    rewards: RewardPolicy,
}

impl<A, U, I, N> ApparelService<A, U, I, N> {
    /// Create a new service using the default reward policy.
    pub fn new(
        apparel: Arc<A>,
        users: Arc<U>,
        images: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            apparel,
            users,
            images,
            notifier,
            clock,
            rewards: RewardPolicy::default(),
        }
    }
}

impl<A, U, I, N> ApparelService<A, U, I, N>
where
    A: ApparelRepository,
    U: UserRepository,
    I: ImageStore,
    N: Notifier,
{
    fn map_apparel_error(error: ApparelPersistenceError) -> Error {
        match error {
            ApparelPersistenceError::Connection { message } => {
                Error::internal(format!("apparel repository unavailable: {message}"))
            }
            ApparelPersistenceError::Query { message } => {
                Error::internal(format!("apparel repository error: {message}"))
            }
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        Error::internal(format!("reward update failed: {error}"))
    }

    async fn reward(&self, owner: &UserId) -> Result<RewardOutcome, Error> {
        self.users
            .apply_submission_reward(owner, &self.rewards)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| {
                Error::internal(format!("reward target {owner} no longer exists"))
            })
    }

    async fn announce(&self, outcome: &RewardOutcome) {
        let Some(badge) = &outcome.awarded else {
            return;
        };
        info!(user_id = %outcome.user.id(), %badge, "badge awarded");
        let notification = EmailNotification::badge_earned(&outcome.user, badge);
        if let Err(error) = self.notifier.send(&notification).await {
            warn!(user_id = %outcome.user.id(), %error, "badge email failed");
        }
    }
}

#[async_trait]
impl<A, U, I, N> ApparelSubmission for ApparelService<A, U, I, N>
where
    A: ApparelRepository,
    U: UserRepository,
    I: ImageStore,
    N: Notifier,
{
    async fn submit(&self, request: ApparelSubmissionRequest) -> Result<Apparel, Error> {
        let ApparelSubmissionRequest {
            owner,
            details,
            image,
            location,
        } = request;

        let image_url = self
            .images
            .store(image)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;

        let apparel = Apparel {
            id: ApparelId::random(),
            owner,
            details,
            image_url,
            location,
            created_at: self.clock.utc(),
        };
        self.apparel.insert(&apparel).await.map_err(|error| {
            warn!(image_url = %apparel.image_url, "apparel insert failed after upload");
            Self::map_apparel_error(error)
        })?;

        let outcome = self.reward(&apparel.owner).await?;
        info!(
            apparel_id = %apparel.id,
            user_id = %apparel.owner,
            points = outcome.user.points(),
            "apparel submitted"
        );
        self.announce(&outcome).await;
        Ok(apparel)
    }
}

#[async_trait]
impl<A, U, I, N> ApparelQuery for ApparelService<A, U, I, N>
where
    A: ApparelRepository,
    U: UserRepository,
    I: ImageStore,
    N: Notifier,
{
    async fn list_owned(&self, owner: &UserId) -> Result<Vec<Apparel>, Error> {
        self.apparel
            .list_by_owner(owner)
            .await
            .map_err(Self::map_apparel_error)
    }

    async fn nearby(&self, search: &NearbySearch) -> Result<Vec<Apparel>, Error> {
        let mut found = self
            .apparel
            .find_nearby(search)
            .await
            .map_err(Self::map_apparel_error)?;
        found.truncate(search.limit());
        Ok(found)
    }
}

#[cfg(test)]
#[path = "apparel_service_tests.rs"]
mod tests;
