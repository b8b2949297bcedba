//! End-of-run notification by email

use std::sync::Arc;

use async_trait::async_trait;
use sluice_notify::{compose, MailSender, SmtpMailer};
use sluice_schemas::EmailTarget;
use thiserror::Error;
use tracing::{instrument, warn};

use super::traits::Notifier;
use crate::model::RunOutcome;

/// Sending the notification failed. Only ever logged, never changes a run's outcome
#[derive(Debug, Error)]
#[error(transparent)]
pub struct NotificationError(#[from] sluice_notify::Error);

/// Whether a notification went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Sent,

    /// No complete email configuration, nothing was sent
    Disabled,
}

/// Sends the canned status email to the configured receivers
pub struct EmailNotifier {
    target: Option<EmailTarget>,
    sender: Option<Arc<dyn MailSender>>,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl EmailNotifier {
    /// Notifier delivering over SMTP. `None` disables notification
    pub fn new(target: Option<EmailTarget>) -> Self {
        Self {
            target,
            sender: None,
        }
    }

    /// Deliver through `sender` instead of an SMTP connection
    pub fn with_sender(target: Option<EmailTarget>, sender: Arc<dyn MailSender>) -> Self {
        Self {
            target,
            sender: Some(sender),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[instrument(skip_all, fields(success = outcome.is_success()), err)]
    async fn notify(&self, outcome: &RunOutcome) -> Result<Notification, NotificationError> {
        let Some(target) = &self.target else {
            warn!("Email configuration not found or incomplete. Skipping email notification.");
            return Ok(Notification::Disabled);
        };

        let message = compose(target, outcome.is_success())?;

        match &self.sender {
            Some(sender) => sender.send(message).await?,
            None => SmtpMailer::try_new(target)?.send(message).await?,
        }

        Ok(Notification::Sent)
    }
}
