//! Tests for the identity service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockNotifier, MockPasswordHasher, MockTokenService, MockUserRepository, NotifierError,
};
use crate::domain::{AccessToken, ErrorCode, PasswordDigest, Username};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

type TestService =
    IdentityService<MockUserRepository, MockPasswordHasher, MockTokenService, MockNotifier>;

fn make_service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenService,
    notifier: MockNotifier,
) -> TestService {
    IdentityService::new(
        Arc::new(users),
        Arc::new(hasher),
        Arc::new(tokens),
        Arc::new(notifier),
        Arc::new(FixtureClock),
    )
}

fn details() -> RegistrationDetails {
    RegistrationDetails::try_from_parts("ada", "Ada@Example.com", "secret").expect("details")
}

fn stored_account() -> UserAccount {
    UserAccount {
        user: User::register(
            UserId::random(),
            Username::new("ada").expect("username"),
            EmailAddress::new("ada@example.com").expect("email"),
            FixtureClock.utc(),
        ),
        password_digest: PasswordDigest::new("digest"),
    }
}

fn issuing_tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_issue()
        .returning(|id| Ok(AccessToken::new(format!("token-for-{id}"))));
    tokens
}

#[tokio::test]
async fn register_creates_account_and_issues_token() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|account| {
            account.user.email().as_ref() == "ada@example.com"
                && account.user.points() == 0
                && account.password_digest.as_str() == "digest"
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "secret")
        .times(1)
        .return_once(|_| Ok(PasswordDigest::new("digest")));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .withf(|mail| mail.subject == "Welcome to Apparel Recycling Platform")
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, hasher, issuing_tokens(), notifier);
    let session = service.register(details()).await.expect("registration");

    assert_eq!(session.user.username().as_ref(), "ada");
    assert_eq!(session.user.created_at(), FixtureClock.utc());
    assert_eq!(
        session.token.as_str(),
        format!("token-for-{}", session.user.id())
    );
}

#[tokio::test]
async fn register_rejects_taken_email_without_inserting() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(stored_account())));
    users.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();

    let service = make_service(users, hasher, MockTokenService::new(), notifier);
    let error = service.register(details()).await.expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), DUPLICATE_EMAIL_MESSAGE);
}

#[tokio::test]
async fn register_maps_racing_duplicate_to_invalid_request() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email("ada@example.com")));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordDigest::new("digest")));

    let service = make_service(users, hasher, MockTokenService::new(), MockNotifier::new());
    let error = service.register(details()).await.expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn register_survives_welcome_email_failure() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users.expect_insert().return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordDigest::new("digest")));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .times(1)
        .return_once(|_| Err(NotifierError::delivery("relay refused")));

    let service = make_service(users, hasher, issuing_tokens(), notifier);
    assert!(service.register(details()).await.is_ok());
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::Unauthorized))]
#[tokio::test]
async fn login_checks_password(#[case] matches: bool, #[case] expected: Option<ErrorCode>) {
    let account = stored_account();
    let user_id = account.user.id().clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email.as_ref() == "ada@example.com")
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .return_once(move |_, _| Ok(matches));

    let service = make_service(users, hasher, issuing_tokens(), MockNotifier::new());
    let credentials =
        LoginCredentials::try_from_parts("ADA@example.com", "secret").expect("credentials");
    let result = service.login(&credentials).await;

    match (expected, result) {
        (None, Ok(session)) => assert_eq!(session.user.id(), &user_id),
        (Some(code), Err(error)) => {
            assert_eq!(error.code(), code);
            assert_eq!(error.message(), INVALID_CREDENTIALS_MESSAGE);
        }
        (expected, other) => panic!("expected {expected:?}, got {other:?}"),
    }
}

#[rstest]
#[case("nobody@example.com")]
#[case("not-an-email")]
#[tokio::test]
async fn login_rejects_unknown_accounts_like_bad_passwords(#[case] email: &str) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_decoy_digest()
        .times(1)
        .return_const(PasswordDigest::new("decoy"));
    hasher
        .expect_verify()
        .withf(|password, digest| password.to_string() == "secret" && digest.as_str() == "decoy")
        .times(1)
        .returning(|_, _| Ok(false));

    let service = make_service(users, hasher, MockTokenService::new(), MockNotifier::new());
    let credentials = LoginCredentials::try_from_parts(email, "secret").expect("credentials");
    let error = service.login(&credentials).await.expect_err("unknown");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS_MESSAGE);
}

#[tokio::test]
async fn fetch_profile_reports_missing_users() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(
        users,
        MockPasswordHasher::new(),
        MockTokenService::new(),
        MockNotifier::new(),
    );
    let error = service
        .fetch_profile(&UserId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), USER_NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn repository_outages_become_internal_errors() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(|_| Err(UserPersistenceError::connection("pool exhausted")));

    let service = make_service(
        users,
        MockPasswordHasher::new(),
        MockTokenService::new(),
        MockNotifier::new(),
    );
    let error = service
        .fetch_profile(&UserId::random())
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn decoy_verification_errors_still_read_as_bad_credentials() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_decoy_digest()
        .return_const(PasswordDigest::new("decoy"));
    hasher
        .expect_verify()
        .times(1)
        .returning(|_, _| Err(PasswordHashError::malformed_digest("bad decoy")));

    let service = make_service(users, hasher, MockTokenService::new(), MockNotifier::new());
    let credentials =
        LoginCredentials::try_from_parts("nobody@example.com", "secret").expect("credentials");
    let error = service.login(&credentials).await.expect_err("unknown");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS_MESSAGE);
}
