//! Email notifications for sluice
//!
//! Provides the end-of-run message and an SMTP sender built on
//! [lettre](https://docs.rs/lettre). Message composition is pure, sending goes through
//! the [`MailSender`] trait so callers can substitute the transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use sluice_schemas::EmailTarget;
use tracing::{debug, instrument};

pub mod error;
pub use error::Error;
pub type Result<T> = core::result::Result<T, Error>;

pub use lettre::Message;

/// Subject line of every notification
pub const SUBJECT: &str = "CSV File Transmission Status";

/// Body sent when the run succeeded
pub const SUCCESS_BODY: &str = "The CSV file has been successfully transmitted to the SFTP server.";

/// Body sent when the run failed
pub const FAILURE_BODY: &str =
    "An error occurred while transmitting the CSV file to the SFTP server.";

/// Build the notification for a run
pub fn compose(target: &EmailTarget, success: bool) -> Result<Message> {
    let from: Mailbox = target
        .sender_email
        .parse()
        .map_err(|source| Error::Address {
            address: target.sender_email.clone(),
            source,
        })?;

    let mut builder = Message::builder()
        .from(from)
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN);

    for receiver in &target.receiver_emails {
        let to: Mailbox = receiver.parse().map_err(|source| Error::Address {
            address: receiver.clone(),
            source,
        })?;
        builder = builder.to(to);
    }

    let body = if success { SUCCESS_BODY } else { FAILURE_BODY };

    Ok(builder.body(body.to_string())?)
}

/// Delivers composed messages
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
}

/// [`MailSender`] using SMTP with STARTTLS and login authentication
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Prepare a transport for the target. No connection is opened until a message is sent.
    pub fn try_new(target: &EmailTarget) -> Result<Self> {
        let credentials = Credentials::new(
            target.sender_email.clone(),
            target.sender_password.expose().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&target.smtp_server)?
            .port(target.smtp_port)
            .credentials(credentials)
            .timeout(target.timeout)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    #[instrument(skip_all, err)]
    async fn send(&self, message: Message) -> Result<()> {
        let response = self.transport.send(message).await?;
        debug!("SMTP server answered with code {}", response.code());

        Ok(())
    }
}
