//! Transactional email content.

use super::user::{Badge, EmailAddress, User};

/// Email addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailNotification {
    pub to: EmailAddress,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailNotification {
    /// Greeting sent after registration.
    pub fn welcome(user: &User) -> Self {
        Self {
            to: user.email().clone(),
            subject: "Welcome to Apparel Recycling Platform".to_owned(),
            text: "Thank you for joining our platform!".to_owned(),
            html: format!(
                "<h1>Welcome, {}!</h1><p>Thank you for joining our platform!</p>",
                escape_html(user.username().as_ref())
            ),
        }
    }

    /// Congratulation sent when a milestone badge is granted.
    pub fn badge_earned(user: &User, badge: &Badge) -> Self {
        let badge = badge.as_ref();
        Self {
            to: user.email().clone(),
            subject: "New Badge Earned!".to_owned(),
            text: format!("Congratulations! You've earned the {badge} badge."),
            html: format!(
                "<h1>New Badge Earned!</h1><p>Congratulations! You've earned the <strong>{}</strong> badge.</p>",
                escape_html(badge)
            ),
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
