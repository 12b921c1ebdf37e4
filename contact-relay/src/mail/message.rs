//! Notification message composition.

use std::error::Error as StdError;

use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::{Address, Message};

use super::MailError;
use crate::form::ContactSubmission;
use crate::Config;

/// Display name on the `From` header of every notification.
pub const SENDER_DISPLAY_NAME: &str = "Portfolio Alert Service";

/// Delimiter framing the submitter's message in the body.
const BANNER: &str = "-----------------------------------------";

/// `From` mailbox of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub display_name: String,
    pub address: String,
}

/// A composed notification, ready for a [`Mailer`](super::Mailer).
///
/// Addresses are kept as plain strings. `from` and `to` are parsed when the
/// message is turned into its wire form; `reply_to` is written as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: Sender,
    pub reply_to: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Compose the notification for a submission.
pub fn compose(submission: &ContactSubmission, config: &Config) -> OutboundMessage {
    OutboundMessage {
        from: Sender {
            display_name: SENDER_DISPLAY_NAME.to_string(),
            address: config.sender_address.clone(),
        },
        reply_to: submission.email.clone(),
        to: config.receiver_address.clone(),
        subject: format!("New work call from {} (Urgent!)", submission.name),
        body: format!(
            "Hey!\n\nYou got a new message from your portfolio website. Check it out:\n\n\
             Submitted By (Name): {name}\n\
             Contact Email: {email}\n\n\
             Their Message:\n\
             {BANNER}\n\
             {message}\n\
             {BANNER}\n\
             \n\n- The Java Contact Server Bot",
            name = submission.name,
            email = submission.email,
            message = submission.message,
        ),
    }
}

impl OutboundMessage {
    /// Build the single-part plain-text wire message.
    pub fn to_lettre(&self) -> Result<Message, MailError> {
        let from = Mailbox::new(
            Some(self.from.display_name.clone()),
            parse_address(&self.from.address)?,
        );
        let reply_to = RawReplyTo::new(&self.reply_to)?;
        let to = Mailbox::new(None, parse_address(&self.to)?);

        Message::builder()
            .from(from)
            .header(reply_to)
            .to(to)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

/// `Reply-To` carrying the submitter's address verbatim.
///
/// Only line breaks are refused, since they would end the header early.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawReplyTo(String);

impl RawReplyTo {
    fn new(raw: &str) -> Result<Self, MailError> {
        if raw.contains(['\r', '\n']) {
            return Err(MailError::Address {
                address: raw.to_string(),
                reason: "line break in address".to_string(),
            });
        }
        Ok(Self(raw.trim().to_string()))
    }
}

impl Header for RawReplyTo {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Reply-To")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;

    fn config() -> Config {
        Config {
            sender_address: "alerts@example.com".to_string(),
            sender_secret: "secret".to_string(),
            receiver_address: "owner@example.com".to_string(),
            port: 5000,
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            smtp_timeout_secs: 10,
            source: CredentialSource::Environment,
        }
    }

    fn jane() -> ContactSubmission {
        ContactSubmission {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            message: "Hi".to_string(),
        }
    }

    #[test]
    fn test_compose_headers() {
        let message = compose(&jane(), &config());

        assert_eq!(message.subject, "New work call from Jane (Urgent!)");
        assert_eq!(message.reply_to, "jane@x.com");
        assert_eq!(message.to, "owner@example.com");
        assert_eq!(message.from.address, "alerts@example.com");
        assert_eq!(message.from.display_name, "Portfolio Alert Service");
    }

    #[test]
    fn test_compose_body_template() {
        let message = compose(&jane(), &config());

        let expected = "Hey!\n\nYou got a new message from your portfolio website. Check it out:\n\n\
Submitted By (Name): Jane\n\
Contact Email: jane@x.com\n\n\
Their Message:\n\
-----------------------------------------\n\
Hi\n\
-----------------------------------------\n\
\n\n- The Java Contact Server Bot";
        assert_eq!(message.body, expected);
        assert!(message
            .body
            .contains(&format!("{BANNER}\nHi\n{BANNER}")));
    }

    #[test]
    fn test_to_lettre_sets_headers() {
        let wire = compose(&jane(), &config()).to_lettre().unwrap();
        let formatted = String::from_utf8(wire.formatted()).unwrap();

        let header = |name: &str| {
            formatted
                .lines()
                .find(|line| line.starts_with(name))
                .unwrap_or_default()
                .to_string()
        };

        assert!(header("From:").contains("Portfolio Alert Service"));
        assert!(header("From:").contains("alerts@example.com"));
        assert!(header("Reply-To:").contains("jane@x.com"));
        assert!(header("To:").contains("owner@example.com"));
        assert_eq!(header("Subject:"), "Subject: New work call from Jane (Urgent!)");
        assert!(header("Content-Type:").contains("text/plain"));
    }

    #[test]
    fn test_to_lettre_keeps_reply_to_as_typed() {
        for email in ["b", "jane at x dot com"] {
            let mut submission = jane();
            submission.email = email.to_string();

            let wire = compose(&submission, &config()).to_lettre().unwrap();
            let formatted = String::from_utf8(wire.formatted()).unwrap();
            assert!(
                formatted.contains(&format!("Reply-To: {email}\r\n")),
                "{formatted}"
            );
        }
    }

    #[test]
    fn test_to_lettre_rejects_line_break_in_reply_to() {
        let mut submission = jane();
        submission.email = "jane@x.com\r\nBcc: victim@example.com".to_string();

        let err = compose(&submission, &config()).to_lettre().unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_to_lettre_rejects_placeholder_receiver() {
        let mut config = config();
        config.receiver_address = crate::config::PLACEHOLDER_RECEIVER.to_string();

        let err = compose(&jane(), &config).to_lettre().unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }
}
