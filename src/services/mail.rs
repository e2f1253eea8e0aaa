//! Notification mail for catalog changes
//!
//! Delivery is best effort: [MailService::send] hands the message to a spawned task and
//! returns immediately. A failing [Mailer] is logged, never reported to the caller.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub body: String,
}

/// Transport for notification mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Writes every message to the log instead of sending it
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            from = %self.from,
            subject = %message.subject,
            body = %message.body,
            "Mail"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct MailService {
    mailer: Arc<dyn Mailer>,
    enabled: bool,
}

impl MailService {
    pub fn new(mailer: Arc<dyn Mailer>, enabled: bool) -> Self {
        Self { mailer, enabled }
    }

    /// Queue a message for delivery.
    ///
    /// Returns the delivery task, or `None` when mail is disabled.
    pub fn send(&self, message: MailMessage) -> Option<JoinHandle<()>> {
        if !self.enabled {
            debug!(subject = %message.subject, "Mail disabled, skipping");
            return None;
        }

        let mailer = self.mailer.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = mailer.send(&message).await {
                warn!(subject = %message.subject, error = %e, "Failed to send mail");
            }
        }))
    }
}
