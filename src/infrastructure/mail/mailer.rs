use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use derive_more::Display;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::settings::{AppConfig, SmtpSecurity};
use super::message::OutgoingEmail;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MailError {
    #[display("Invalid email address: {_0}")]
    InvalidAddress(String),

    #[display("Failed to build message: {_0}")]
    Build(String),

    #[display("SMTP error: {_0}")]
    Smtp(String),

    #[display("SMTP relay unreachable: {_0}")]
    Unreachable(String),
}

impl std::error::Error for MailError {}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::Smtp(err.to_string())
    }
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Confirms the relay accepts a connection with the configured credentials.
    async fn verify(&self) -> Result<(), MailError>;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

#[async_trait]
impl<T> Mailer for Arc<T>
where
    T: Mailer + ?Sized,
{
    async fn verify(&self) -> Result<(), MailError> {
        (**self).verify().await
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        (**self).send(email).await
    }
}

/// [`Mailer`] backed by an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Address,
    relay: String,
}

impl SmtpMailer {
    pub fn new(config: &AppConfig) -> Result<Self, MailError> {
        let builder = match config.smtp_security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let from = parse_address(config.sender_address())?;

        Ok(SmtpMailer {
            transport,
            from,
            relay: format!("{}:{}", config.smtp_host, config.smtp_port),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let to = parse_address(&email.to)?;

        Message::builder()
            .from(Mailbox::new(Some(email.sender_name.clone()), self.from.clone()))
            .to(Mailbox::new(None, to))
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Unreachable(self.relay.clone())),
            Err(e) => Err(MailError::Unreachable(format!("{}: {}", self.relay, e))),
        }
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let response = self.transport.send(message).await?;

        tracing::debug!(
            to = %email.to,
            code = %response.code(),
            "Message accepted by relay"
        );
        Ok(())
    }
}

fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.parse::<Address>()
        .map_err(|e| MailError::InvalidAddress(format!("{raw}: {e}")))
}
