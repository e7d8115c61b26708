//! User data model.
//!
//! A user accumulates reward points and badges through apparel submissions.
//! Identity primitives validate their input on construction so adapters
//! never hold malformed values.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("badge label must not be empty")]
    EmptyBadge,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;

/// Public handle chosen at registration.
///
/// Stored trimmed; must not be blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address used as the login identifier.
///
/// ## Invariants
/// - Trimmed and lower-cased, so uniqueness checks are case-insensitive.
/// - Shaped like `local@domain.tld` and at most [`EMAIL_MAX`] characters.
///
/// # Examples
/// ```
/// use loopwear::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, normalise and construct an [`EmailAddress`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Achievement label attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Badge(pub(super) String);

impl Badge {
    /// Validate and construct a [`Badge`].
    pub fn new(label: impl Into<String>) -> Result<Self, UserValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(UserValidationError::EmptyBadge);
        }
        Ok(Self(label))
    }
}

impl AsRef<str> for Badge {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Application user.
///
/// ## Invariants
/// - `badges` preserves award order and never holds duplicates.
/// - `points` only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    points: u32,
    badges: Vec<Badge>,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

/// Component bundle for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub points: u32,
    pub badges: Vec<Badge>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts, dropping repeated badges.
    pub fn new(parts: UserParts) -> Self {
        let UserParts {
            id,
            username,
            email,
            points,
            badges,
            is_admin,
            created_at,
        } = parts;
        let mut unique: Vec<Badge> = Vec::with_capacity(badges.len());
        for badge in badges {
            if !unique.contains(&badge) {
                unique.push(badge);
            }
        }
        Self {
            id,
            username,
            email,
            points,
            badges: unique,
            is_admin,
            created_at,
        }
    }

    /// Fresh account with no points or badges.
    pub fn register(
        id: UserId,
        username: Username,
        email: EmailAddress,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::new(UserParts {
            id,
            username,
            email,
            points: 0,
            badges: Vec::new(),
            is_admin: false,
            created_at,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Accumulated reward points.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Badges in award order.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the reward state, keeping identity fields.
    pub fn with_rewards(self, points: u32, badges: Vec<Badge>) -> Self {
        Self::new(UserParts {
            id: self.id,
            username: self.username,
            email: self.email,
            points,
            badges,
            is_admin: self.is_admin,
            created_at: self.created_at,
        })
    }

    /// Whether the user already holds `badge`.
    pub fn has_badge(&self, badge: &Badge) -> bool {
        self.badges.contains(badge)
    }
}
