#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use reviewdesk::{
    config::{Config, StoreBackend},
    db::{reviewerdb::ReviewerExt, InMemoryStore, StoreHandle},
    dtos::reviewdtos::SubmitReviewDto,
    models::{
        reviewermodel::ReviewerProfile,
        submissionmodel::Submission,
        usermodel::{Caller, UserRole},
    },
    service::{
        notification_service::{NotifyError, Notifier},
        payment_webhook::{sign_payload, WebhookOutcome},
        storage_service::PublicBucketStorage,
    },
    utils::token::create_token,
    AppState,
};

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const JWT_SECRET: &str = "identity-secret";
pub const APP_URL: &str = "https://reviews.example.com";
pub const REVIEWER_ID: &str = "rev_1";
pub const ADMIN_ID: &str = "admin_1";

#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Captures outbound notifications; can be switched to fail every delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = RecordingNotifier::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("mail provider unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentNotification {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        database_url: String::new(),
        redis_url: None,
        app_url: APP_URL.to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        identity_jwt_secret: JWT_SECRET.to_string(),
        checkout_webhook_secret: WEBHOOK_SECRET.to_string(),
        webhook_tolerance_secs: 300,
        resend_api_key: None,
        from_email: "reviews@example.com".to_string(),
        storage_public_base_url: "https://storage.example.com/audio".to_string(),
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(notifier);
        let handle: StoreHandle = store.clone();
        let state = AppState::new(
            test_config(),
            handle,
            None,
            notifier.clone(),
            Arc::new(PublicBucketStorage::new("https://storage.example.com/audio")),
        );

        TestApp {
            state: Arc::new(state),
            store,
            notifier,
        }
    }

    pub async fn add_reviewer(&self, id: &str, name: &str, email: &str) -> ReviewerProfile {
        let now = Utc::now();
        self.store
            .upsert_reviewer(ReviewerProfile {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                avatar_url: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    /// Delivers a signed checkout-completed event and returns the created submission.
    pub async fn paid_submission(&self, payment_intent: &str, reviewer_id: &str, amount: i64) -> Submission {
        let body = checkout_completed(payment_intent, reviewer_id, amount).to_string();
        let signature = sign(&body);
        match self
            .state
            .webhooks
            .handle(Some(&signature), body.as_bytes())
            .await
            .unwrap()
        {
            WebhookOutcome::Created(submission) => submission,
            other => panic!("expected a created submission, got {:?}", other),
        }
    }
}

pub fn sign(body: &str) -> String {
    sign_payload(body.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp())
}

pub fn checkout_metadata(reviewer_id: &str) -> Value {
    json!({
        "artistName": "Jane Doe",
        "songTitle": "Glow",
        "contactEmail": "jane@example.com",
        "audioUrl": "https://cdn.example.com/audio/glow.mp3",
        "genre": "Pop",
        "reviewerId": reviewer_id,
        "packageId": "pkg_standard"
    })
}

pub fn checkout_event(payment_intent: &str, amount: i64, metadata: Value) -> Value {
    json!({
        "id": format!("evt_{}", payment_intent),
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "payment_intent": payment_intent,
                "payment_status": "paid",
                "amount_total": amount,
                "currency": "usd",
                "metadata": metadata
            }
        }
    })
}

pub fn checkout_completed(payment_intent: &str, reviewer_id: &str, amount: i64) -> Value {
    checkout_event(payment_intent, amount, checkout_metadata(reviewer_id))
}

pub fn charge_event(event_type: &str, payment_intent: &str) -> Value {
    json!({
        "id": format!("evt_{}_{}", event_type, payment_intent),
        "type": event_type,
        "data": { "object": { "payment_intent": payment_intent } }
    })
}

pub fn review_for(submission_id: Uuid) -> SubmitReviewDto {
    SubmitReviewDto {
        submission_id,
        scores: [("production".to_string(), 8.0), ("vocals".to_string(), 7.5)]
            .into_iter()
            .collect(),
        overall_score: 7.8,
        strengths: "Memorable chorus".to_string(),
        improvements: "The low end is muddy".to_string(),
        summary: "A promising single".to_string(),
    }
}

pub fn reviewer(uid: &str) -> Caller {
    Caller::new(uid, UserRole::Reviewer)
}

pub fn admin() -> Caller {
    Caller::new(ADMIN_ID, UserRole::Admin)
}

pub fn artist() -> Caller {
    Caller::new("artist_1", UserRole::Artist)
}

pub fn bearer(uid: &str, role: UserRole) -> String {
    format!("Bearer {}", create_token(uid, role, JWT_SECRET.as_bytes(), 3600).unwrap())
}
