// service/notification_service.rs
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    db::{reviewerdb::ReviewerExt, StoreHandle},
    mail::mails,
    models::submissionmodel::Submission,
    service::settings_service::SettingsService,
};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Outbound message channel. Delivery is attempted once per call from the
/// caller's point of view; retries are the implementation's concern.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Used when no mail provider is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::info!("Notification (not delivered, no mail provider): to={} subject={}", recipient, subject);
        Ok(())
    }
}

/// Best-effort notifications. Failures are logged and never surface to the caller.
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    store: StoreHandle,
    settings: Arc<SettingsService>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, store: StoreHandle, settings: Arc<SettingsService>) -> Self {
        Self { notifier, store, settings }
    }

    pub async fn notify_reviewer_of_submission(&self, submission: &Submission) {
        let settings = self.settings.get().await;
        if !settings.notify_reviewers {
            tracing::debug!("Reviewer notifications disabled; skipping submission {}", submission.id);
            return;
        }

        let reviewer = match self.store.get_reviewer(&submission.reviewer_id).await {
            Ok(Some(reviewer)) => reviewer,
            Ok(None) => {
                tracing::warn!(
                    "No profile for reviewer {}; submission {} not announced",
                    submission.reviewer_id,
                    submission.id
                );
                return;
            }
            Err(e) => {
                tracing::warn!("Reviewer lookup failed for {}: {}", submission.reviewer_id, e);
                return;
            }
        };

        let mail = mails::new_submission_mail(&settings, &reviewer.name, submission);
        self.deliver(&reviewer.email, &mail.subject, &mail.body).await;
    }

    pub async fn notify_artist_review_ready(&self, submission: &Submission, review_url: &str) {
        let settings = self.settings.get().await;
        let mail = mails::review_ready_mail(&settings, submission, review_url);
        self.deliver(&submission.contact_email, &mail.subject, &mail.body).await;
    }

    async fn deliver(&self, recipient: &str, subject: &str, body: &str) {
        if let Err(e) = self.notifier.notify(recipient, subject, body).await {
            tracing::warn!("Notification to {} failed: {}", recipient, e);
        }
    }
}
