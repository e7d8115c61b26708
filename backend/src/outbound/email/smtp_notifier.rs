//! SMTP implementation of the `Notifier` port built on `lettre`.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::EmailNotification;
use crate::domain::ports::{Notifier, NotifierError};

/// Connection security for the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Upgrade a plaintext connection with STARTTLS.
    #[default]
    StartTls,
    /// Implicit TLS from the first byte.
    Tls,
    /// No encryption. Only for local relays such as MailHog.
    None,
}

/// Relay settings for [`SmtpNotifier`].
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub security: SmtpSecurity,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: None,
            password: None,
            security: SmtpSecurity::default(),
        }
    }
}

/// Sends notifications through an SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier. The transport connects lazily on first send.
    ///
    /// # Errors
    ///
    /// Fails when the sender address cannot be parsed or the TLS setup for
    /// the relay host is rejected.
    pub fn new(config: SmtpConfig, from: &str) -> Result<Self, NotifierError> {
        let from: Mailbox = from
            .parse()
            .map_err(|err| NotifierError::compose(format!("invalid sender address: {err}")))?;

        let mut builder = match config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|err| NotifierError::delivery(err.to_string()))?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|err| NotifierError::delivery(err.to_string()))?,
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(username, password.as_str().to_owned()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// Build the MIME message for a notification.
fn compose(from: &Mailbox, notification: &EmailNotification) -> Result<Message, NotifierError> {
    let to: Mailbox = notification
        .to
        .as_ref()
        .parse()
        .map_err(|err| NotifierError::compose(format!("invalid recipient: {err}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(notification.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            notification.text.clone(),
            notification.html.clone(),
        ))
        .map_err(|err| NotifierError::compose(err.to_string()))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &EmailNotification) -> Result<(), NotifierError> {
        let message = compose(&self.from, notification)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| NotifierError::delivery(err.to_string()))?;
        debug!(
            to = %notification.to,
            code = %response.code(),
            "email accepted by relay"
        );
        Ok(())
    }
}
