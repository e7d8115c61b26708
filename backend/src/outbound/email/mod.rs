//! Transactional email adapters.

mod smtp_notifier;

pub use smtp_notifier::{SmtpConfig, SmtpNotifier, SmtpSecurity};
