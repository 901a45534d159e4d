//! Digest delivery over authenticated SMTP submission.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::Config;

/// Outbound relay; STARTTLS on the submission port.
pub const SMTP_RELAY: &str = "smtp.office365.com";
pub const SMTP_PORT: u16 = 587;

pub const DIGEST_RECIPIENT: &str = "christopher.j.king@vanderbilt.edu";
pub const DIGEST_SUBJECT: &str = "Today's appointments";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid mailbox address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("Failed to build digest email")]
    Compose(#[from] lettre::error::Error),
    #[error("SMTP submission failed")]
    Transport(#[from] lettre::transport::smtp::Error),
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|source| NotifyError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Build the digest email: one `text/html` part inside a mixed multipart body.
pub fn compose(sender: &str, recipient: &str, html: String) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(mailbox(sender)?)
        .to(mailbox(recipient)?)
        .subject(DIGEST_SUBJECT)
        .multipart(
            MultiPart::mixed().singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html),
            ),
        )?;
    Ok(message)
}

/// Sends digests from the configured sender mailbox.
pub struct Mailer {
    sender: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(SMTP_RELAY)?
            .port(SMTP_PORT)
            .credentials(Credentials::new(
                config.email.clone(),
                config.email_password.clone(),
            ))
            .build();

        Ok(Self {
            sender: config.email.clone(),
            transport,
        })
    }

    /// Submit `html` as the digest to [`DIGEST_RECIPIENT`].
    pub async fn send_digest(&self, html: String) -> Result<(), NotifyError> {
        let message = compose(&self.sender, DIGEST_RECIPIENT, html)?;
        let response = self.transport.send(message).await?;
        info!(
            recipient = DIGEST_RECIPIENT,
            code = %response.code(),
            "Digest email accepted by relay"
        );
        Ok(())
    }
}
