//! Builders wiring outbound adapters into the domain services behind
//! [`HttpState`].

use std::sync::Arc;

use async_trait::async_trait;
use loopwear::domain::ports::{LogOnlyNotifier, Notifier, NotifierError};
use loopwear::domain::{ApparelService, EmailNotification, IdentityService};
use loopwear::inbound::http::health::ReadinessProbe;
use loopwear::inbound::http::state::HttpState;
use loopwear::outbound::email::SmtpNotifier;
use loopwear::outbound::persistence::{DbPool, DieselApparelRepository, DieselUserRepository};
use loopwear::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use loopwear::outbound::storage::S3ImageStore;
use mockable::{Clock, DefaultClock};

/// Notifier chosen at startup: SMTP when a relay is configured, otherwise
/// log-only.
pub enum ConfiguredNotifier {
    Smtp(SmtpNotifier),
    LogOnly(LogOnlyNotifier),
}

#[async_trait]
impl Notifier for ConfiguredNotifier {
    async fn send(&self, notification: &EmailNotification) -> Result<(), NotifierError> {
        match self {
            Self::Smtp(notifier) => notifier.send(notification).await,
            Self::LogOnly(notifier) => notifier.send(notification).await,
        }
    }
}

/// Readiness probe pinging PostgreSQL.
pub struct DatabaseProbe(pub DbPool);

#[async_trait]
impl ReadinessProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn check(&self) -> Result<(), String> {
        self.0.ping().await.map_err(|err| err.to_string())
    }
}

/// Adapters shared by every worker.
pub struct Adapters {
    pub pool: DbPool,
    pub images: S3ImageStore,
    pub notifier: ConfiguredNotifier,
    pub tokens: JwtTokenService,
}

/// Assemble the handler state from concrete adapters.
pub fn build_http_state(adapters: Adapters) -> HttpState {
    let Adapters {
        pool,
        images,
        notifier,
        tokens,
    } = adapters;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let apparel = Arc::new(DieselApparelRepository::new(pool));
    let notifier = Arc::new(notifier);
    let tokens = Arc::new(tokens);

    let identity = Arc::new(IdentityService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        tokens.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    let submissions = Arc::new(ApparelService::new(
        apparel,
        users,
        Arc::new(images),
        notifier,
        clock,
    ));

    HttpState {
        registration: identity.clone(),
        login: identity.clone(),
        profile: identity,
        submission: submissions.clone(),
        apparel: submissions,
        tokens,
    }
}
