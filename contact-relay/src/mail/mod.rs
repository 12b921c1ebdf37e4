//! Outbound mail: composing the notification and handing it to SMTP.
//!
//! ```text
//! ContactSubmission + Config → compose() → OutboundMessage → Mailer::send()
//! ```

pub mod mailer;
pub mod message;

pub use mailer::{Mailer, SmtpMailer};
pub use message::{compose, OutboundMessage, Sender, SENDER_DISPLAY_NAME};

use thiserror::Error;

/// Mail errors.
///
/// Only `Transport` means the SMTP exchange itself failed; the other
/// variants are local problems with the message or the configuration.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

impl MailError {
    pub fn is_transport(&self) -> bool {
        matches!(self, MailError::Transport(_))
    }
}
