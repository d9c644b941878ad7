// service/payment_webhook.rs
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use validator::Validate;

use crate::{
    db::{submissiondb::SubmissionExt, StoreHandle},
    models::submissionmodel::{NewSubmission, PaymentStatus, Submission},
    service::notification_service::NotificationService,
    utils::secure_token::generate_secure_token,
};

pub const SIGNATURE_HEADER: &str = "checkout-signature";

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const CHARGE_REFUNDED: &str = "charge.refunded";
pub const CHARGE_DISPUTED: &str = "charge.dispute.created";

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Missing {} header", SIGNATURE_HEADER)]
    MissingSignature,

    #[error("Malformed signature header")]
    MalformedSignature,

    #[error("Signature timestamp outside tolerance")]
    StaleTimestamp,

    #[error("Invalid webhook signature")]
    SignatureMismatch,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Internal error")]
    Internal(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::MalformedSignature
            | WebhookError::StaleTimestamp
            | WebhookError::SignatureMismatch
            | WebhookError::InvalidPayload(_)
            | WebhookError::MissingField(_)
            | WebhookError::InvalidField(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::db::StoreError> for WebhookError {
    fn from(err: crate::db::StoreError) -> Self {
        WebhookError::Internal(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: CheckoutMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    pub artist_name: Option<String>,
    pub song_title: Option<String>,
    pub contact_email: Option<String>,
    pub audio_url: Option<String>,
    pub genre: Option<String>,
    pub reviewer_id: Option<String>,
    pub package_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChargeObject {
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Created(Submission),
    /// Re-delivery of an event whose submission already exists.
    Duplicate,
    PaymentFlagged { payment_intent_id: String, status: PaymentStatus },
    Ignored(String),
}

fn required(field: Option<String>, name: &'static str) -> Result<String, WebhookError> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(WebhookError::MissingField(name))
}

impl CheckoutSession {
    /// Fields are checked in a fixed order; the first absent one is reported.
    pub fn into_new_submission(self, tracking_token: String) -> Result<NewSubmission, WebhookError> {
        let metadata = self.metadata;
        let artist_name = required(metadata.artist_name, "artistName")?;
        let song_title = required(metadata.song_title, "songTitle")?;
        let contact_email = required(metadata.contact_email, "contactEmail")?;
        let audio_url = required(metadata.audio_url, "audioUrl")?;
        let genre = required(metadata.genre, "genre")?;
        let reviewer_id = required(metadata.reviewer_id, "reviewerId")?;
        let package_id = required(metadata.package_id, "packageId")?;
        let payment_intent_id = required(self.payment_intent, "payment_intent")?;

        let submission = NewSubmission {
            artist_name,
            song_title,
            contact_email,
            audio_url,
            genre,
            reviewer_id,
            package_id,
            payment_intent_id,
            tracking_token,
            amount: self.amount_total.unwrap_or(0),
            currency: self
                .currency
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or_else(|| "usd".to_string()),
        };

        submission
            .validate()
            .map_err(|e| WebhookError::InvalidField(e.to_string()))?;

        Ok(submission)
    }
}

/// Checks `t=<unix>,v1=<hex>` against HMAC-SHA256(secret, "<t>.<body>").
pub fn verify_signature(
    header: &str,
    body: &[u8],
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::MalformedSignature)?);
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
    if candidates.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }

    let skew = now.checked_sub(timestamp).map(i64::unsigned_abs);
    match skew {
        Some(skew) if skew <= tolerance_secs.unsigned_abs() => {}
        _ => return Err(WebhookError::StaleTimestamp),
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::Internal(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());

    let matched = candidates
        .iter()
        .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Produces a header value for `body`; the provider side of `verify_signature`.
pub fn sign_payload(body: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

pub struct WebhookService {
    store: StoreHandle,
    notifications: Arc<NotificationService>,
    secret: String,
    tolerance_secs: i64,
}

impl WebhookService {
    pub fn new(
        store: StoreHandle,
        notifications: Arc<NotificationService>,
        secret: String,
        tolerance_secs: i64,
    ) -> Self {
        Self {
            store,
            notifications,
            secret,
            tolerance_secs,
        }
    }

    /// Verifies before parsing; nothing is written unless the signature holds.
    pub async fn handle(&self, signature: Option<&str>, body: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        let signature = signature.ok_or(WebhookError::MissingSignature)?;

        if let Err(e) = verify_signature(signature, body, &self.secret, self.tolerance_secs, Utc::now().timestamp()) {
            tracing::warn!("Rejected checkout webhook: {}", e);
            return Err(e);
        }

        let event: CheckoutEvent =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        tracing::debug!("Checkout event {:?} of type {}", event.id, event.event_type);

        match event.event_type.as_str() {
            CHECKOUT_COMPLETED => self.checkout_completed(event.data.object).await,
            CHARGE_REFUNDED => self.flag_payment(event.data.object, PaymentStatus::Refunded).await,
            CHARGE_DISPUTED => self.flag_payment(event.data.object, PaymentStatus::Disputed).await,
            other => {
                tracing::info!("Unhandled checkout webhook event: {}", other);
                Ok(WebhookOutcome::Ignored(format!("unhandled event {}", other)))
            }
        }
    }

    async fn checkout_completed(&self, object: serde_json::Value) -> Result<WebhookOutcome, WebhookError> {
        let session: CheckoutSession =
            serde_json::from_value(object).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        if let Some(status) = session.payment_status.as_deref() {
            if status != "paid" {
                tracing::info!("Checkout completed with payment_status={}; not creating a submission", status);
                return Ok(WebhookOutcome::Ignored(format!("payment_status {}", status)));
            }
        }

        let new_submission = match session.into_new_submission(generate_secure_token()) {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!("Rejected checkout webhook: {}", e);
                return Err(e);
            }
        };

        if self
            .store
            .get_submission_by_payment_intent(&new_submission.payment_intent_id)
            .await?
            .is_some()
        {
            tracing::info!(
                "Duplicate checkout delivery for payment intent {}",
                new_submission.payment_intent_id
            );
            return Ok(WebhookOutcome::Duplicate);
        }

        let submission = match self.store.insert_submission_if_absent(new_submission).await? {
            Some(submission) => submission,
            // Lost a race against a concurrent re-delivery.
            None => return Ok(WebhookOutcome::Duplicate),
        };

        tracing::info!(
            "Submission {} created for payment intent {} (reviewer {})",
            submission.id,
            submission.payment_intent_id,
            submission.reviewer_id
        );

        self.notifications.notify_reviewer_of_submission(&submission).await;

        Ok(WebhookOutcome::Created(submission))
    }

    async fn flag_payment(
        &self,
        object: serde_json::Value,
        status: PaymentStatus,
    ) -> Result<WebhookOutcome, WebhookError> {
        let charge: ChargeObject =
            serde_json::from_value(object).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
        let payment_intent_id = required(charge.payment_intent, "payment_intent")?;

        match self.store.set_payment_status(&payment_intent_id, status).await? {
            Some(submission) => {
                tracing::info!(
                    "Submission {} payment flagged as {:?} (payment intent {})",
                    submission.id,
                    status,
                    payment_intent_id
                );
                Ok(WebhookOutcome::PaymentFlagged { payment_intent_id, status })
            }
            None => {
                tracing::info!("No submission for payment intent {}; {:?} ignored", payment_intent_id, status);
                Ok(WebhookOutcome::Ignored(format!("unknown payment intent {}", payment_intent_id)))
            }
        }
    }
}
