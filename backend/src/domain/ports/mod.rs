//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`UserRegistration`, `LoginService`, `UserProfileQuery`,
//! `ApparelSubmission`, `ApparelQuery`) are called by inbound adapters.
//! Driven ports (repositories, image store, notifier, password hasher, token
//! service) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod apparel_query;
mod apparel_repository;
mod apparel_submission;
mod image_store;
mod login_service;
mod notifier;
mod password_hasher;
mod token_service;
mod user_profile_query;
mod user_registration;
mod user_repository;

#[cfg(test)]
pub use apparel_query::MockApparelQuery;
pub use apparel_query::ApparelQuery;
#[cfg(test)]
pub use apparel_repository::MockApparelRepository;
pub use apparel_repository::{ApparelPersistenceError, ApparelRepository};
#[cfg(test)]
pub use apparel_submission::MockApparelSubmission;
pub use apparel_submission::{ApparelSubmission, ApparelSubmissionRequest};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{LogOnlyNotifier, Notifier, NotifierError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_registration::MockUserRegistration;
pub use user_registration::UserRegistration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
