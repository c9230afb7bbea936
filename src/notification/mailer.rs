use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::debug;

use crate::config::SmtpConfig;
use crate::error::{KioskError, KioskResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> KioskResult<()>;
}

/// Authenticated SMTP over implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> KioskResult<Self> {
        let from: Mailbox = config.username.parse().map_err(|e| {
            KioskError::Validation(format!("USERNAME '{}' is not a mailbox: {}", config.username, e))
        })?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .map_err(|e| KioskError::Dependency(format!("smtp relay {}: {}", config.server, e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> KioskResult<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| KioskError::Validation(format!("invalid recipient '{}': {}", email.to, e)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| KioskError::Validation(format!("could not build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| KioskError::Dependency(format!("smtp send to {}: {}", email.to, e)))?;
        debug!("Email sent to {}", email.to);
        Ok(())
    }
}

/// Used when no SMTP server is configured; every send fails.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> KioskResult<()> {
        Err(KioskError::Dependency(format!(
            "SMTP is not configured, cannot email {}",
            email.to
        )))
    }
}
