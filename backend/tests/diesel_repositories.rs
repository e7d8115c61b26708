//! Diesel adapters against a PostGIS database.
//!
//! Covers the single-statement reward update and the `ST_DWithin` proximity
//! query, neither of which the in-memory doubles execute. Requires
//! `LOOPWEAR_TEST_DATABASE_URL`; see `support/postgis.rs`.

mod support;

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::future::join_all;
use loopwear::domain::ports::{ApparelRepository, UserPersistenceError, UserRepository};
use loopwear::domain::{
    Apparel, ApparelDetails, ApparelId, EmailAddress, GeoPoint, ImageUrl, NearbySearch,
    PasswordDigest, RewardPolicy, SearchRadius, User, UserAccount, UserId, UserParts, Username,
};
use loopwear::outbound::persistence::{DbPool, DieselApparelRepository, DieselUserRepository};
use rstest::{fixture, rstest};
use support::{TestDatabase, test_database};

/// Geodesic metres per degree of longitude along the WGS84 equator.
const METRES_PER_DEGREE: f64 = 111_319.49;

#[fixture]
fn database() -> Option<TestDatabase> {
    test_database()
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn account(email: &str, points: u32) -> UserAccount {
    UserAccount {
        user: User::new(UserParts {
            id: UserId::random(),
            username: Username::new("ada").expect("username"),
            email: EmailAddress::new(email).expect("email"),
            points,
            badges: Vec::new(),
            is_admin: false,
            created_at: epoch(),
        }),
        password_digest: PasswordDigest::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
    }
}

/// A coat dropped `metres_east` along the equator from (0, 0).
fn coat(owner: &UserId, metres_east: f64, minute: i64) -> Apparel {
    Apparel {
        id: ApparelId::random(),
        owner: owner.clone(),
        details: ApparelDetails::try_from_parts("coat", "good", "M", "Wool coat")
            .expect("details"),
        image_url: ImageUrl::new("https://images.test/apparel/coat.jpg"),
        location: GeoPoint::new(metres_east / METRES_PER_DEGREE, 0.0).expect("point"),
        created_at: epoch() + Duration::minutes(minute),
    }
}

fn ids(records: &[Apparel]) -> Vec<ApparelId> {
    records.iter().map(|record| record.id).collect()
}

fn around_origin(radius_metres: Option<f64>) -> NearbySearch {
    NearbySearch::new(
        GeoPoint::new(0.0, 0.0).expect("origin"),
        radius_metres.map(|metres| SearchRadius::new(metres).expect("radius")),
    )
}

async fn seeded_owner(pool: &DbPool, email: &str) -> UserId {
    let owner = account(email, 0);
    DieselUserRepository::new(pool.clone())
        .insert(&owner)
        .await
        .expect("insert owner");
    owner.user.id().clone()
}

async fn store_all(repo: &DieselApparelRepository, records: &[Apparel]) {
    for record in records {
        repo.insert(record).await.expect("insert apparel");
    }
}

#[rstest]
#[tokio::test]
async fn milestone_badge_is_appended_exactly_once(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let users = DieselUserRepository::new(database.pool(2).await);
    let account = account("ada@example.com", 95);
    users.insert(&account).await.expect("insert");
    let policy = RewardPolicy::default();
    let badge = policy.milestone_badge().clone();

    let first = users
        .apply_submission_reward(account.user.id(), &policy)
        .await
        .expect("reward")
        .expect("user exists");
    assert_eq!(first.user.points(), 105);
    assert_eq!(first.awarded, Some(badge.clone()));

    let second = users
        .apply_submission_reward(account.user.id(), &policy)
        .await
        .expect("reward")
        .expect("user exists");
    assert_eq!(second.user.points(), 115);
    assert_eq!(second.awarded, None);

    let stored = users
        .find_by_id(account.user.id())
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(stored.points(), 115);
    assert_eq!(stored.badges().to_vec(), vec![badge]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rewards_serialise_on_the_user_row(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let users = DieselUserRepository::new(database.pool(6).await);
    let account = account("grace@example.com", 60);
    users.insert(&account).await.expect("insert");
    let policy = RewardPolicy::default();

    let outcomes: Vec<_> = join_all(
        (0..6).map(|_| users.apply_submission_reward(account.user.id(), &policy)),
    )
    .await
    .into_iter()
    .map(|outcome| outcome.expect("reward").expect("user exists"))
    .collect();

    let mut points: Vec<u32> = outcomes.iter().map(|outcome| outcome.user.points()).collect();
    points.sort_unstable();
    assert_eq!(points, vec![70, 80, 90, 100, 110, 120]);

    let awarded: Vec<u32> = outcomes
        .iter()
        .filter(|outcome| outcome.awarded.is_some())
        .map(|outcome| outcome.user.points())
        .collect();
    assert_eq!(awarded, vec![100], "only the update reaching 100 awards");

    let stored = users
        .find_by_id(account.user.id())
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(stored.points(), 120);
    assert_eq!(stored.badges().len(), 1);
}

#[rstest]
#[tokio::test]
async fn rewarding_an_unknown_user_changes_nothing(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let users = DieselUserRepository::new(database.pool(1).await);

    let outcome = users
        .apply_submission_reward(&UserId::random(), &RewardPolicy::default())
        .await
        .expect("statement runs");

    assert!(outcome.is_none());
}

#[rstest]
#[tokio::test]
async fn email_uniqueness_ignores_case(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let users = DieselUserRepository::new(database.pool(1).await);
    users
        .insert(&account("ada@example.com", 0))
        .await
        .expect("first insert");

    let mut shouting = account("ada@example.com", 0);
    shouting.user = User::new(UserParts {
        id: UserId::random(),
        username: Username::new("ADA").expect("username"),
        email: EmailAddress::new("ADA@EXAMPLE.COM").expect("email"),
        points: 0,
        badges: Vec::new(),
        is_admin: false,
        created_at: epoch(),
    });
    let error = users.insert(&shouting).await.expect_err("duplicate");

    assert!(matches!(error, UserPersistenceError::DuplicateEmail { .. }));
}

#[rstest]
#[tokio::test]
async fn nearby_is_capped_at_the_closest_twenty(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let pool = database.pool(2).await;
    let owner = seeded_owner(&pool, "linus@example.com").await;
    let apparel = DieselApparelRepository::new(pool);

    // 40 m apart along the equator, stored farthest first.
    let mut close: Vec<Apparel> = (1..=25)
        .map(|step| coat(&owner, f64::from(step) * 40.0, i64::from(step)))
        .collect();
    let mut stored = close.clone();
    stored.reverse();
    stored.push(coat(&owner, 5_000.0, 0));
    store_all(&apparel, &stored).await;

    let capped = apparel
        .find_nearby(&around_origin(Some(2_000.0)))
        .await
        .expect("search");
    close.truncate(20);
    assert_eq!(ids(&capped), ids(&close));

    let within_500 = apparel
        .find_nearby(&around_origin(Some(500.0)))
        .await
        .expect("search");
    assert_eq!(ids(&within_500), ids(&close[..12]));
}

#[rstest]
#[tokio::test]
async fn distant_records_need_a_wider_radius(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let pool = database.pool(2).await;
    let owner = seeded_owner(&pool, "margaret@example.com").await;
    let apparel = DieselApparelRepository::new(pool);
    let near = coat(&owner, 300.0, 0);
    let far = coat(&owner, 5_000.0, 1);
    store_all(&apparel, &[far.clone(), near.clone()]).await;

    let narrow = apparel
        .find_nearby(&around_origin(Some(1_000.0)))
        .await
        .expect("search");
    assert_eq!(ids(&narrow), vec![near.id]);

    let just_short = apparel
        .find_nearby(&around_origin(Some(4_900.0)))
        .await
        .expect("search");
    assert_eq!(ids(&just_short), vec![near.id]);

    let default_radius = apparel
        .find_nearby(&around_origin(None))
        .await
        .expect("search");
    assert_eq!(ids(&default_radius), vec![near.id, far.id]);
}

#[rstest]
#[tokio::test]
async fn owner_listing_is_newest_first_and_private(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let pool = database.pool(2).await;
    let owner = seeded_owner(&pool, "barbara@example.com").await;
    let stranger = seeded_owner(&pool, "ken@example.com").await;
    let apparel = DieselApparelRepository::new(pool);

    let oldest = coat(&owner, 10.0, 1);
    let newest = coat(&owner, 20.0, 3);
    let middle = coat(&owner, 30.0, 2);
    let theirs = coat(&stranger, 40.0, 4);
    store_all(&apparel, &[oldest.clone(), newest.clone(), middle.clone(), theirs]).await;

    let listed = apparel.list_by_owner(&owner).await.expect("list");

    assert_eq!(ids(&listed), vec![newest.id, middle.id, oldest.id]);
}

#[rstest]
#[tokio::test]
async fn equal_timestamps_order_by_descending_id(database: Option<TestDatabase>) {
    let Some(database) = database else { return };
    let pool = database.pool(2).await;
    let owner = seeded_owner(&pool, "edsger@example.com").await;
    let apparel = DieselApparelRepository::new(pool);

    let mut twins = vec![coat(&owner, 100.0, 7), coat(&owner, 100.0, 7), coat(&owner, 100.0, 7)];
    store_all(&apparel, &twins).await;
    twins.sort_by(|a, b| b.id.as_uuid().cmp(a.id.as_uuid()));

    let listed = apparel.list_by_owner(&owner).await.expect("list");
    let nearby = apparel
        .find_nearby(&around_origin(None))
        .await
        .expect("search");

    assert_eq!(ids(&listed), ids(&twins));
    assert_eq!(ids(&nearby), ids(&twins));
}
