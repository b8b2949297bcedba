//! Notification target

use std::time::Duration;

use bon::Builder;
use tracing::warn;

use crate::error::ValidationError;
use crate::raw::RawEmail;
use crate::secret::Secret;
use crate::values::{non_blank, split_list};

const SECTION: &str = "Email";

/// Port used when `smtp_port` is not configured (SMTP submission with STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay and recipients of the end-of-run summary
#[derive(Debug, Clone, Builder)]
pub struct EmailTarget {
    pub smtp_server: String,

    #[builder(default = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,

    /// Used both as the `From` address and the SMTP login
    pub sender_email: String,
    pub sender_password: Secret,
    pub receiver_emails: Vec<String>,
    pub timeout: Option<Duration>,
}

impl RawEmail {
    /// Convert into a target, or `None` when notification cannot be sent: a required key
    /// is absent or blank, or a value is malformed. Malformed values are logged and never
    /// fail the configuration.
    pub fn into_target(self) -> Option<EmailTarget> {
        let smtp_port = match self.smtp_port.map(|p| p.to_port(SECTION, "smtp_port")).transpose() {
            Ok(port) => port.unwrap_or(DEFAULT_SMTP_PORT),
            Err(error) => return disabled(error),
        };
        let timeout = match self
            .timeout_secs
            .map(|t| t.to_timeout(SECTION, "timeout_secs"))
            .transpose()
        {
            Ok(timeout) => timeout,
            Err(error) => return disabled(error),
        };

        let receiver_emails = non_blank(self.receiver_emails)
            .map(|list| split_list(&list))
            .filter(|list| !list.is_empty());

        match (
            non_blank(self.smtp_server),
            non_blank(self.sender_email),
            non_blank(self.sender_password),
            receiver_emails,
        ) {
            (Some(smtp_server), Some(sender_email), Some(sender_password), Some(receiver_emails)) => {
                Some(EmailTarget {
                    smtp_server,
                    smtp_port,
                    sender_email,
                    sender_password: sender_password.into(),
                    receiver_emails,
                    timeout,
                })
            }
            _ => None,
        }
    }
}

fn disabled(error: ValidationError) -> Option<EmailTarget> {
    warn!("{error}. Email notification is disabled.");
    None
}
