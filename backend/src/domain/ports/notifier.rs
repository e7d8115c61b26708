//! Driven port for transactional email.
//!
//! Callers treat delivery as best-effort: failures are logged, never
//! surfaced to clients.

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailNotification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotifierError {
        /// The message could not be built from its parts.
        Compose { message: String } => "email could not be composed: {message}",
        /// The transport failed to deliver the message.
        Delivery { message: String } => "email delivery failed: {message}",
    }
}

/// Sends an email to a single recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &EmailNotification) -> Result<(), NotifierError>;
}

/// Notifier that only records the email in the log.
///
/// Used when no SMTP relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn send(&self, notification: &EmailNotification) -> Result<(), NotifierError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "email delivery disabled; notification logged only"
        );
        Ok(())
    }
}
