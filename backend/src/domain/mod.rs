//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services implementing the driving ports. Types validate
//! on construction and stay free of transport concerns.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserAccount and identity primitives.
//! - Apparel, ApparelDetails, Condition, ImageUpload.
//! - GeoPoint, SearchRadius, NearbySearch.
//! - RewardPolicy and its outcomes.
//! - IdentityService, ApparelService.

pub mod apparel;
mod apparel_service;
pub mod auth;
pub mod error;
pub mod geo;
mod identity_service;
pub mod notification;
pub mod ports;
pub mod rewards;
pub mod trace_id;
pub mod user;

pub use self::apparel::{
    Apparel, ApparelDetails, ApparelId, ApparelValidationError, Condition, ImageUpload, ImageUrl,
};
pub use self::apparel_service::ApparelService;
pub use self::auth::{
    AccessToken, AuthenticatedSession, LoginCredentials, LoginValidationError, PasswordDigest,
    RegistrationDetails, RegistrationValidationError, UserAccount,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{GeoPoint, GeoValidationError, NearbySearch, SearchRadius};
pub use self::identity_service::IdentityService;
pub(crate) use self::identity_service::INVALID_CREDENTIALS_MESSAGE;
pub use self::notification::EmailNotification;
pub use self::rewards::{RewardOutcome, RewardPolicy, RewardTally};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Badge, EmailAddress, User, UserId, UserParts, UserValidationError, Username,
};
