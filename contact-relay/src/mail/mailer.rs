//! Mailer trait and SMTP implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use super::{MailError, OutboundMessage};
use crate::Config;

/// Async email sending trait.
///
/// One call is one delivery attempt; nothing here retries.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// SMTP mailer over implicit TLS, authenticated as the configured sender.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build the transport from configuration. No connection is opened here.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let timeout = Duration::from_secs(config.smtp_timeout_secs);
        let credentials =
            Credentials::new(config.sender_address.clone(), config.sender_secret.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        info!(
            smtp_host = %config.smtp_host,
            smtp_port = config.smtp_port,
            timeout_secs = config.smtp_timeout_secs,
            "smtp_mailer_created"
        );

        Ok(Self {
            transport: Arc::new(transport),
            timeout,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = message.to_lettre()?;

        // lettre's timeout is per socket operation; this bounds the whole exchange.
        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(response)) => {
                info!(
                    code = %response.code(),
                    to = %message.to,
                    "smtp_message_accepted"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(MailError::Transport(e.to_string())),
            Err(_) => Err(MailError::Transport(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}
