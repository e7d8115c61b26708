//! Backend entry-point: loads settings, prepares adapters and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use aws_config::BehaviorVersion;
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use loopwear::domain::ports::LogOnlyNotifier;
use loopwear::inbound::http::health::HealthState;
use loopwear::outbound::email::SmtpNotifier;
use loopwear::outbound::persistence::{DbPool, run_pending_migrations};
use loopwear::outbound::security::JwtTokenService;
use loopwear::outbound::storage::{S3ImageStore, S3Location};

use server::{
    Adapters, AppSettings, ConfiguredNotifier, DatabaseProbe, build_http_state, create_server,
};

const DEFAULT_AWS_REGION: &str = "us-east-1";

fn load_settings() -> std::io::Result<AppSettings> {
    AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))
}

async fn migrate(database_url: String) -> std::io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");
    Ok(())
}

async fn image_store(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> std::io::Result<S3ImageStore> {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let region = sdk_config
        .region()
        .map_or(DEFAULT_AWS_REGION, |region| region.as_ref())
        .to_owned();
    let mut location = S3Location::new(settings.s3_bucket()?, &region);
    if let Some(base) = settings.s3_public_base_url() {
        location = location.with_public_base_url(base);
    }
    info!(bucket = location.bucket(), %region, "image store configured");
    Ok(S3ImageStore::new(
        aws_sdk_s3::Client::new(&sdk_config),
        location,
        clock,
    ))
}

fn notifier(settings: &AppSettings) -> std::io::Result<ConfiguredNotifier> {
    match settings.smtp_config()? {
        Some(config) => {
            let host = config.host.clone();
            let notifier =
                SmtpNotifier::new(config, settings.mail_from()).map_err(std::io::Error::other)?;
            info!(%host, "smtp notifier configured");
            Ok(ConfiguredNotifier::Smtp(notifier))
        }
        None => {
            warn!("LOOPWEAR_SMTP_HOST unset; emails will only be logged");
            Ok(ConfiguredNotifier::LogOnly(LogOnlyNotifier))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings()?;
    let pool_config = settings.pool_config()?;
    if settings.run_migrations() {
        migrate(pool_config.database_url().to_owned()).await?;
    }
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = JwtTokenService::new(
        settings.jwt_secret()?,
        settings.token_ttl_days()?,
        clock.clone(),
    );
    let adapters = Adapters {
        pool: pool.clone(),
        images: image_store(&settings, clock).await?,
        notifier: notifier(&settings)?,
        tokens,
    };

    let health_state =
        web::Data::new(HealthState::new().with_probe(Arc::new(DatabaseProbe(pool))));
    let bind_addr = settings.bind_addr()?;
    let server = create_server(health_state, build_http_state(adapters), bind_addr)?;
    info!(%bind_addr, "server listening");
    server.await
}
