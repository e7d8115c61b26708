//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ApparelQuery, ApparelSubmission, LoginService, TokenService, UserProfileQuery,
    UserRegistration,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub submission: Arc<dyn ApparelSubmission>,
    pub apparel: Arc<dyn ApparelQuery>,
    /// Verifies bearer tokens on protected routes.
    pub tokens: Arc<dyn TokenService>,
}
