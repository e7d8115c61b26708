//! In-memory adapters for integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature so suites
//! under `tests/` can drive the real domain services without PostgreSQL,
//! S3 or SMTP.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use zeroize::Zeroizing;

use crate::domain::ports::{
    ApparelPersistenceError, ApparelRepository, ImageStore, ImageStoreError, Notifier,
    NotifierError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Apparel, ApparelService, EmailAddress, EmailNotification, IdentityService, ImageUpload,
    ImageUrl, NearbySearch, RewardOutcome, RewardPolicy, User, UserAccount, UserId,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::security::{Argon2PasswordHasher, DEFAULT_TOKEN_TTL_DAYS, JwtTokenService};

/// Signing secret used by [`InMemoryBackend`].
pub const TEST_JWT_SECRET: &str = "loopwear-test-secret";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User repository backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        lock(&self.accounts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a user's points, keeping badges. Returns false when absent.
    pub fn set_points(&self, id: &UserId, points: u32) -> bool {
        let mut accounts = lock(&self.accounts);
        let Some(account) = accounts.iter_mut().find(|account| account.user.id() == id) else {
            return false;
        };
        let badges = account.user.badges().to_vec();
        account.user = account.user.clone().with_rewards(points, badges);
        true
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        if accounts
            .iter()
            .any(|existing| existing.user.email() == account.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().to_string(),
            ));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|account| account.user.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn apply_submission_reward(
        &self,
        id: &UserId,
        policy: &RewardPolicy,
    ) -> Result<Option<RewardOutcome>, UserPersistenceError> {
        // The lock spans read and write, matching the row lock in PostgreSQL.
        let mut accounts = lock(&self.accounts);
        let Some(account) = accounts.iter_mut().find(|account| account.user.id() == id) else {
            return Ok(None);
        };
        let tally = policy.apply(account.user.points(), account.user.badges());
        account.user = account.user.clone().with_rewards(tally.points, tally.badges);
        Ok(Some(RewardOutcome {
            user: account.user.clone(),
            awarded: tally.awarded,
        }))
    }
}

/// Apparel repository backed by a vector, with haversine proximity search.
#[derive(Debug, Default)]
pub struct InMemoryApparelRepository {
    records: Mutex<Vec<Apparel>>,
}

impl InMemoryApparelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Apparel> {
        lock(&self.records).clone()
    }
}

/// Newest first; equal timestamps fall back to the larger id, matching the
/// Diesel adapter's `ORDER BY created_at DESC, id DESC`.
fn newest_first(a: &Apparel, b: &Apparel) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
}

#[async_trait]
impl ApparelRepository for InMemoryApparelRepository {
    async fn insert(&self, apparel: &Apparel) -> Result<(), ApparelPersistenceError> {
        lock(&self.records).push(apparel.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Apparel>, ApparelPersistenceError> {
        let mut owned: Vec<Apparel> = lock(&self.records)
            .iter()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(newest_first);
        Ok(owned)
    }

    async fn find_nearby(
        &self,
        search: &NearbySearch,
    ) -> Result<Vec<Apparel>, ApparelPersistenceError> {
        let mut hits: Vec<(f64, Apparel)> = lock(&self.records)
            .iter()
            .filter(|record| search.contains(&record.location))
            .map(|record| (search.center.distance_metres(&record.location), record.clone()))
            .collect();
        hits.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| newest_first(a, b)));
        hits.truncate(search.limit());
        Ok(hits.into_iter().map(|(_, record)| record).collect())
    }
}

/// Image store that keeps uploads in memory and returns fake URLs.
#[derive(Debug, Default)]
pub struct RecordingImageStore {
    uploads: Mutex<Vec<ImageUpload>>,
    fail: bool,
}

impl RecordingImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose uploads always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<ImageUpload> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn store(&self, image: ImageUpload) -> Result<ImageUrl, ImageStoreError> {
        if self.fail {
            return Err(ImageStoreError::upload("bucket unavailable"));
        }
        let mut uploads = lock(&self.uploads);
        let url = format!(
            "https://images.test/apparel/{}-{}",
            uploads.len(),
            image.file_name()
        );
        uploads.push(image);
        Ok(ImageUrl::new(url))
    }
}

/// Notifier that records every email instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that records nothing and reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailNotification> {
        lock(&self.sent).clone()
    }

    /// Subjects of emails sent to `to`, in send order.
    pub fn subjects_for(&self, to: &str) -> Vec<String> {
        lock(&self.sent)
            .iter()
            .filter(|email| email.to.as_ref() == to)
            .map(|email| email.subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &EmailNotification) -> Result<(), NotifierError> {
        if self.fail {
            return Err(NotifierError::delivery("relay refused connection"));
        }
        lock(&self.sent).push(notification.clone());
        Ok(())
    }
}

/// Real domain services, Argon2 hashing and JWT tokens wired to the
/// in-memory adapters above.
pub struct InMemoryBackend {
    pub users: Arc<InMemoryUserRepository>,
    pub apparel: Arc<InMemoryApparelRepository>,
    pub images: Arc<RecordingImageStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub tokens: Arc<JwtTokenService>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::with_adapters(RecordingImageStore::new(), RecordingNotifier::new())
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend using the given image store and notifier.
    pub fn with_adapters(images: RecordingImageStore, notifier: RecordingNotifier) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            apparel: Arc::new(InMemoryApparelRepository::new()),
            images: Arc::new(images),
            notifier: Arc::new(notifier),
            tokens: Arc::new(JwtTokenService::new(
                Zeroizing::new(TEST_JWT_SECRET.to_owned()),
                DEFAULT_TOKEN_TTL_DAYS,
                clock,
            )),
        }
    }

    /// Handler state sharing this backend's adapters.
    pub fn http_state(&self) -> HttpState {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let identity = Arc::new(IdentityService::new(
            self.users.clone(),
            Arc::new(Argon2PasswordHasher::new()),
            self.tokens.clone(),
            self.notifier.clone(),
            clock.clone(),
        ));
        let submissions = Arc::new(ApparelService::new(
            self.apparel.clone(),
            self.users.clone(),
            self.images.clone(),
            self.notifier.clone(),
            clock,
        ));
        HttpState {
            registration: identity.clone(),
            login: identity.clone(),
            profile: identity,
            submission: submissions.clone(),
            apparel: submissions,
            tokens: self.tokens.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApparelDetails, ApparelId, GeoPoint, SearchRadius, Username};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn item(owner: &UserId, lon: f64, lat: f64, minute: i64) -> Apparel {
        Apparel {
            id: ApparelId::random(),
            owner: owner.clone(),
            details: ApparelDetails::try_from_parts("shirt", "good", "L", "Linen")
                .expect("details"),
            image_url: ImageUrl::new("https://images.test/x.jpg"),
            location: GeoPoint::new(lon, lat).expect("point"),
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("timestamp")
                + Duration::minutes(minute),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn nearby_orders_by_distance_then_newest() {
        let repo = InMemoryApparelRepository::new();
        let owner = UserId::random();
        let far = item(&owner, 0.02, 0.0, 0);
        let near_old = item(&owner, 0.01, 0.0, 1);
        let near_new = item(&owner, 0.01, 0.0, 2);
        let outside = item(&owner, 1.0, 0.0, 3);
        for record in [&far, &near_old, &near_new, &outside] {
            repo.insert(record).await.expect("insert");
        }

        let search = NearbySearch::new(
            GeoPoint::new(0.0, 0.0).expect("center"),
            Some(SearchRadius::new(5_000.0).expect("radius")),
        );
        let ids: Vec<ApparelId> = repo
            .find_nearby(&search)
            .await
            .expect("search")
            .into_iter()
            .map(|record| record.id)
            .collect();

        assert_eq!(ids, vec![near_new.id, near_old.id, far.id]);
    }

    #[rstest]
    #[tokio::test]
    async fn equal_timestamps_order_by_descending_id() {
        let repo = InMemoryApparelRepository::new();
        let owner = UserId::random();
        let mut records = vec![
            item(&owner, 0.0, 0.0, 5),
            item(&owner, 0.0, 0.0, 5),
            item(&owner, 0.0, 0.0, 5),
        ];
        for record in &records {
            repo.insert(record).await.expect("insert");
        }
        records.sort_by(|a, b| b.id.as_uuid().cmp(a.id.as_uuid()));
        let expected: Vec<ApparelId> = records.iter().map(|record| record.id).collect();

        let listed: Vec<ApparelId> = repo
            .list_by_owner(&owner)
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.id)
            .collect();
        let nearby: Vec<ApparelId> = repo
            .find_nearby(&NearbySearch::new(GeoPoint::new(0.0, 0.0).expect("center"), None))
            .await
            .expect("search")
            .into_iter()
            .map(|record| record.id)
            .collect();

        assert_eq!(listed, expected);
        assert_eq!(nearby, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn reward_is_applied_in_place() {
        let repo = InMemoryUserRepository::new();
        let user = User::register(
            UserId::random(),
            Username::new("ada").expect("username"),
            EmailAddress::new("ada@example.com").expect("email"),
            Utc::now(),
        );
        repo.insert(&UserAccount {
            user: user.clone(),
            password_digest: crate::domain::PasswordDigest::new("digest"),
        })
        .await
        .expect("insert");
        assert!(repo.set_points(user.id(), 95));

        let outcome = repo
            .apply_submission_reward(user.id(), &RewardPolicy::default())
            .await
            .expect("reward")
            .expect("user exists");

        assert_eq!(outcome.user.points(), 105);
        assert!(outcome.awarded.is_some());
        let stored = repo.find_by_id(user.id()).await.expect("find").expect("user");
        assert_eq!(stored.badges().len(), 1);
    }
}
