//! Application settings loaded via OrthoConfig.
//!
//! Values layer CLI flags, `LOOPWEAR_*` environment variables and config
//! files. Every field is optional at load time; accessors apply defaults and
//! report missing required values.

use std::fmt;
use std::net::SocketAddr;

use loopwear::outbound::email::{SmtpConfig, SmtpSecurity};
use loopwear::outbound::persistence::PoolConfig;
use loopwear::outbound::security::DEFAULT_TOKEN_TTL_DAYS;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAIL_FROM: &str = "Loopwear <no-reply@loopwear.local>";

/// Problems found while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting LOOPWEAR_{key}")]
    Missing { key: &'static str },
    #[error("invalid setting LOOPWEAR_{key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl From<SettingsError> for std::io::Error {
    fn from(err: SettingsError) -> Self {
        Self::new(std::io::ErrorKind::InvalidInput, err)
    }
}

/// Runtime configuration for the server binary.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOOPWEAR")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub db_pool_max_size: Option<u32>,
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in days.
    pub token_ttl_days: Option<u32>,
    /// Bucket receiving apparel photos.
    pub s3_bucket: Option<String>,
    /// Public URL prefix for stored photos.
    pub s3_public_base_url: Option<String>,
    /// SMTP relay host. Email is only logged when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// One of `starttls`, `tls` or `none`.
    pub smtp_security: Option<String>,
    /// Sender mailbox for transactional email.
    pub mail_from: Option<String>,
    /// Leave the schema alone on startup instead of applying embedded
    /// migrations.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &redact(&self.database_url))
            .field("db_pool_max_size", &self.db_pool_max_size)
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("token_ttl_days", &self.token_ttl_days)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_public_base_url", &self.s3_public_base_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &redact(&self.smtp_password))
            .field("smtp_security", &self.smtp_security)
            .field("mail_from", &self.mail_from)
            .field("skip_migrations", &self.skip_migrations)
            .finish()
    }
}

fn required<'a>(value: Option<&'a String>, key: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .ok_or(SettingsError::Missing { key })
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                key: "BIND_ADDR",
                message: err.to_string(),
            })
    }

    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = required(self.database_url.as_ref(), "DATABASE_URL")?;
        let config = PoolConfig::new(url);
        Ok(match self.db_pool_max_size {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }

    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        required(self.jwt_secret.as_ref(), "JWT_SECRET")
            .map(|secret| Zeroizing::new(secret.to_owned()))
    }

    pub fn token_ttl_days(&self) -> Result<u32, SettingsError> {
        match self.token_ttl_days {
            Some(0) => Err(SettingsError::Invalid {
                key: "TOKEN_TTL_DAYS",
                message: "must be at least one day".to_owned(),
            }),
            Some(days) => Ok(days),
            None => Ok(DEFAULT_TOKEN_TTL_DAYS),
        }
    }

    pub fn s3_bucket(&self) -> Result<&str, SettingsError> {
        required(self.s3_bucket.as_ref(), "S3_BUCKET")
    }

    pub fn s3_public_base_url(&self) -> Option<&str> {
        self.s3_public_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Relay settings, or `None` when no host is configured.
    pub fn smtp_config(&self) -> Result<Option<SmtpConfig>, SettingsError> {
        let Some(host) = self
            .smtp_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
        else {
            return Ok(None);
        };
        let security = match self
            .smtp_security
            .as_deref()
            .map(|raw| raw.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("starttls") => SmtpSecurity::StartTls,
            Some("tls") => SmtpSecurity::Tls,
            Some("none") => SmtpSecurity::None,
            Some(other) => {
                return Err(SettingsError::Invalid {
                    key: "SMTP_SECURITY",
                    message: format!("unknown mode {other:?}"),
                });
            }
        };
        Ok(Some(SmtpConfig {
            host: host.to_owned(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone().map(Zeroizing::new),
            security,
        }))
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Migrations run unless `LOOPWEAR_SKIP_MIGRATIONS` is set.
    pub fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }
}
