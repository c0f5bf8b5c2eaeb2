//! Confirmation email service.
//!
//! Sends the submitter a confirmation once their row is recorded. Fire and
//! forget: the caller spawns the send and a failure never affects the
//! submission. No-op when SMTP is not configured.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

use clipvault_core::Config;

#[derive(Clone)]
pub struct ConfirmationMailer {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl ConfirmationMailer {
    /// Create the mailer from config. Returns `None` if confirmations are
    /// disabled or SMTP is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.confirmations_enabled() {
            tracing::debug!("Confirmation emails disabled (CONFIRMATIONS_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from = config.smtp_from()?.to_string();
        let port = config.smtp_port().unwrap_or(587);

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?;
            let b = b.port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(
                host = %host,
                port = port,
                "Confirmation mailer initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Confirmation mailer initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    /// Send the submission confirmation to one recipient.
    pub async fn notify(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), String> {
        let to: Mailbox = email
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;

        let body = format!(
            "Hi {} {},\n\n\
             We received your clip submission. Our team will review it and you\n\
             will hear from us once it has been approved.\n\n\
             Thanks for contributing!\n",
            first_name, last_name
        );
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject("We received your clip submission")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| e.to_string())?;

        self.mailer.send(message).await.map_err(|e| e.to_string())?;
        info!(recipient = %email, "Confirmation email sent");
        Ok(())
    }
}
