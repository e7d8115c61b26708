//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Submission rewards are applied with a single `UPDATE ... RETURNING`
//! statement that locks the row, so concurrent submissions for the same user
//! serialise inside PostgreSQL and the milestone badge is appended once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Badge, EmailAddress, PasswordDigest, RewardOutcome, RewardPolicy, User, UserAccount, UserId,
    UserParts, Username,
};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, pool_error_message};
use super::models::{NewUserRow, RewardRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const APPLY_REWARD_SQL: &str = "\
WITH previous AS (
    SELECT id, $3 = ANY(badges) AS had_badge
    FROM users
    WHERE id = $4
    FOR UPDATE
)
UPDATE users AS u
SET points = u.points + $1,
    badges = CASE
        WHEN u.points + $1 >= $2 AND NOT previous.had_badge THEN array_append(u.badges, $3)
        ELSE u.badges
    END,
    updated_at = now()
FROM previous
WHERE u.id = previous.id
RETURNING u.id, u.username, u.email, u.points, u.badges, u.is_admin, u.created_at,
    (NOT previous.had_badge AND $3 = ANY(u.badges)) AS badge_awarded";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn to_db_points(value: u32) -> Result<i32, UserPersistenceError> {
    i32::try_from(value).map_err(|_| UserPersistenceError::query("points exceed storage range"))
}

/// Fields shared by every users-table projection.
struct StoredUser {
    id: Uuid,
    username: String,
    email: String,
    points: i32,
    badges: Vec<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl StoredUser {
    fn into_domain(self) -> Result<User, UserPersistenceError> {
        let corrupt = |field: &str, detail: String| {
            warn!(user_id = %self.id, field, %detail, "stored user row failed validation");
            UserPersistenceError::query(format!("stored user has invalid {field}"))
        };
        let username =
            Username::new(&self.username).map_err(|err| corrupt("username", err.to_string()))?;
        let email =
            EmailAddress::new(&self.email).map_err(|err| corrupt("email", err.to_string()))?;
        let points =
            u32::try_from(self.points).map_err(|err| corrupt("points", err.to_string()))?;
        let badges = self
            .badges
            .iter()
            .map(Badge::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| corrupt("badges", err.to_string()))?;

        Ok(User::new(UserParts {
            id: UserId::from_uuid(self.id),
            username,
            email,
            points,
            badges,
            is_admin: self.is_admin,
            created_at: self.created_at,
        }))
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let stored = StoredUser {
        id: row.id,
        username: row.username,
        email: row.email,
        points: row.points,
        badges: row.badges,
        is_admin: row.is_admin,
        created_at: row.created_at,
    };
    Ok(UserAccount {
        user: stored.into_domain()?,
        password_digest: PasswordDigest::new(row.password_hash),
    })
}

fn row_to_outcome(
    row: RewardRow,
    policy: &RewardPolicy,
) -> Result<RewardOutcome, UserPersistenceError> {
    let awarded = row.badge_awarded.then(|| policy.milestone_badge().clone());
    let stored = StoredUser {
        id: row.id,
        username: row.username,
        email: row.email,
        points: row.points,
        badges: row.badges,
        is_admin: row.is_admin,
        created_at: row.created_at,
    };
    Ok(RewardOutcome {
        user: stored.into_domain()?,
        awarded,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_digest.as_str(),
            points: to_db_points(user.points())?,
            badges: user.badges().iter().map(AsRef::as_ref).collect(),
            is_admin: user.is_admin(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_unique_violation(&error) {
                    UserPersistenceError::duplicate_email(user.email().as_ref())
                } else {
                    map_error(error)
                }
            })
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_account(row).map(|account| account.user))
            .transpose()
    }

    async fn apply_submission_reward(
        &self,
        id: &UserId,
        policy: &RewardPolicy,
    ) -> Result<Option<RewardOutcome>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RewardRow> = diesel::sql_query(APPLY_REWARD_SQL)
            .bind::<Integer, _>(to_db_points(policy.points_per_submission())?)
            .bind::<Integer, _>(to_db_points(policy.milestone_threshold())?)
            .bind::<Text, _>(policy.milestone_badge().as_ref())
            .bind::<SqlUuid, _>(*id.as_uuid())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_outcome(row, policy)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_row(points: i32, badges: &[&str]) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "$argon2id$v=19$stub".to_owned(),
            points,
            badges: badges.iter().map(|badge| (*badge).to_owned()).collect(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn account_rows_keep_digest_and_rewards() {
        let row = user_row(40, &["Recycling Enthusiast"]);
        let id = row.id;
        let account = row_to_account(row).expect("valid row");

        assert_eq!(account.user.id().as_uuid(), &id);
        assert_eq!(account.user.points(), 40);
        assert_eq!(account.user.badges().len(), 1);
        assert_eq!(account.password_digest.as_str(), "$argon2id$v=19$stub");
    }

    #[rstest]
    #[case(user_row(-1, &[]))]
    #[case(user_row(0, &[" "]))]
    fn corrupt_rows_are_query_errors(#[case] row: UserRow) {
        let error = row_to_account(row).expect_err("corrupt row");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn reward_rows_report_the_awarded_badge(#[case] awarded: bool, #[case] expected: bool) {
        let policy = RewardPolicy::default();
        let row = RewardRow {
            id: Uuid::new_v4(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            points: 105,
            badges: vec!["Recycling Enthusiast".to_owned()],
            is_admin: false,
            created_at: Utc::now(),
            badge_awarded: awarded,
        };
        let outcome = row_to_outcome(row, &policy).expect("valid row");

        assert_eq!(outcome.awarded.is_some(), expected);
        assert_eq!(outcome.user.points(), 105);
    }

    #[rstest]
    fn reward_statement_locks_and_guards_the_badge() {
        assert!(APPLY_REWARD_SQL.contains("FOR UPDATE"));
        assert!(APPLY_REWARD_SQL.contains("NOT previous.had_badge"));
    }
}
