mod common;

use common::*;
use reviewdesk::{
    db::submissiondb::SubmissionExt,
    models::submissionmodel::{PaymentStatus, SubmissionStatus},
    service::payment_webhook::{WebhookError, WebhookOutcome},
};
use serde_json::json;

#[tokio::test]
async fn test_checkout_creates_pending_review_submission() {
    let app = TestApp::new();
    app.add_reviewer(REVIEWER_ID, "Riley", "riley@example.com").await;

    let submission = app.paid_submission("pi_100", REVIEWER_ID, 2500).await;

    assert_eq!(submission.status, SubmissionStatus::PendingReview);
    assert_eq!(submission.payment_status, PaymentStatus::Paid);
    assert_eq!(submission.amount, 2500);
    assert_eq!(submission.reviewer_id, REVIEWER_ID);
    assert!(!submission.tracking_token.is_empty());
    assert!(submission.review_id.is_none());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "riley@example.com");
    assert!(sent[0].subject.contains("Glow"));
}

#[tokio::test]
async fn test_redelivery_creates_one_submission() {
    let app = TestApp::new();
    let body = checkout_completed("pi_replay", REVIEWER_ID, 2500).to_string();

    let first = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();
    let second = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();

    assert!(matches!(first, WebhookOutcome::Created(_)));
    assert_eq!(second, WebhookOutcome::Duplicate);

    let all = app.store.list_submissions(None, None, 100, 0).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_concurrent_redelivery_creates_one_submission() {
    let app = TestApp::new();
    let body = checkout_completed("pi_race", REVIEWER_ID, 2500).to_string();
    let signature = sign(&body);

    let (a, b) = tokio::join!(
        app.state.webhooks.handle(Some(&signature), body.as_bytes()),
        app.state.webhooks.handle(Some(&signature), body.as_bytes()),
    );

    let outcomes = [a.unwrap(), b.unwrap()];
    let created = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, WebhookOutcome::Created(_)))
        .count();
    assert_eq!(created, 1);

    let all = app.store.list_submissions(None, None, 100, 0).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_missing_metadata_is_rejected_without_writes() {
    let app = TestApp::new();
    let mut metadata = checkout_metadata(REVIEWER_ID);
    metadata.as_object_mut().unwrap().remove("songTitle");
    let body = checkout_event("pi_incomplete", 2500, metadata).to_string();

    let err = app
        .state
        .webhooks
        .handle(Some(&sign(&body)), body.as_bytes())
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::MissingField("songTitle")));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert!(app.store.list_submissions(None, None, 100, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_signature_writes_nothing() {
    let app = TestApp::new();
    let body = checkout_completed("pi_forged", REVIEWER_ID, 2500).to_string();
    let forged = reviewdesk::service::payment_webhook::sign_payload(
        body.as_bytes(),
        "not-the-secret",
        chrono::Utc::now().timestamp(),
    );

    let err = app.state.webhooks.handle(Some(&forged), body.as_bytes()).await.unwrap_err();
    assert!(matches!(err, WebhookError::SignatureMismatch));

    let err = app.state.webhooks.handle(None, body.as_bytes()).await.unwrap_err();
    assert!(matches!(err, WebhookError::MissingSignature));

    assert!(app
        .store
        .get_submission_by_payment_intent("pi_forged")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unpaid_checkout_is_acknowledged_only() {
    let app = TestApp::new();
    let mut event = checkout_completed("pi_unpaid", REVIEWER_ID, 2500);
    event["data"]["object"]["payment_status"] = json!("unpaid");
    let body = event.to_string();

    let outcome = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();

    assert!(matches!(outcome, WebhookOutcome::Ignored(_)));
    assert!(app.store.list_submissions(None, None, 100, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refund_flags_submission() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_refund", REVIEWER_ID, 2500).await;

    let body = charge_event("charge.refunded", "pi_refund").to_string();
    let outcome = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();

    assert_eq!(
        outcome,
        WebhookOutcome::PaymentFlagged {
            payment_intent_id: "pi_refund".to_string(),
            status: PaymentStatus::Refunded,
        }
    );

    let stored = app.store.get_submission(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Refunded);
    assert_eq!(stored.status, SubmissionStatus::PendingReview);
}

#[tokio::test]
async fn test_dispute_for_unknown_intent_is_ignored() {
    let app = TestApp::new();
    let body = charge_event("charge.dispute.created", "pi_unknown").to_string();

    let outcome = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();
    assert!(matches!(outcome, WebhookOutcome::Ignored(_)));
}

#[tokio::test]
async fn test_unhandled_event_type_is_acknowledged() {
    let app = TestApp::new();
    let body = json!({ "type": "customer.created", "data": { "object": {} } }).to_string();

    let outcome = app.state.webhooks.handle(Some(&sign(&body)), body.as_bytes()).await.unwrap();
    assert!(matches!(outcome, WebhookOutcome::Ignored(_)));
}

#[tokio::test]
async fn test_notifier_failure_keeps_submission() {
    let app = TestApp::with_notifier(RecordingNotifier::failing());
    app.add_reviewer(REVIEWER_ID, "Riley", "riley@example.com").await;

    let submission = app.paid_submission("pi_mail_down", REVIEWER_ID, 2500).await;

    let stored = app.store.get_submission(submission.id).await.unwrap();
    assert_eq!(stored, Some(submission));
}

#[tokio::test]
async fn test_reviewer_notification_respects_settings() {
    let app = TestApp::new();
    app.add_reviewer(REVIEWER_ID, "Riley", "riley@example.com").await;
    app.state
        .settings
        .update(reviewdesk::dtos::settingsdtos::UpdateSettingsDto {
            notify_reviewers: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    app.paid_submission("pi_quiet", REVIEWER_ID, 2500).await;

    assert!(app.notifier.sent().is_empty());
}
