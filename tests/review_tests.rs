mod common;

use common::*;
use reviewdesk::{
    db::{reviewdb::ReviewExt, submissiondb::SubmissionExt},
    dtos::{
        reviewdtos::SubmitReviewOnBehalfDto,
        submissiondtos::{StatusLookup, StatusLookupDto, SubmissionQueryDto},
    },
    models::submissionmodel::SubmissionStatus,
    service::error::ServiceError,
};

#[tokio::test]
async fn test_review_completes_submission_and_notifies_artist() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_review", REVIEWER_ID, 2500).await;
    let caller = reviewer(REVIEWER_ID);

    let submitted = app
        .state
        .reviews
        .submit_review(Some(&caller), review_for(submission.id))
        .await
        .unwrap();

    assert!(submitted
        .review_url
        .starts_with(&format!("{}/review/{}?token=", APP_URL, submitted.review_id)));

    let stored = app.store.get_submission(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Completed);
    assert_eq!(stored.review_id, Some(submitted.review_id));
    assert!(stored.reviewed_at.is_some());

    let review = app.store.get_review(submitted.review_id).await.unwrap().unwrap();
    assert_eq!(review.submission_details.song_title, "Glow");
    assert_eq!(review.access_token.len(), 64);

    let sent = app.notifier.sent();
    let artist_mail = sent
        .iter()
        .find(|mail| mail.recipient == "jane@example.com")
        .expect("artist should be notified");
    assert!(artist_mail.body.contains(&submitted.review_url));
}

#[tokio::test]
async fn test_review_read_requires_matching_token() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_token", REVIEWER_ID, 2500).await;
    let submitted = app
        .state
        .reviews
        .submit_review(Some(&reviewer(REVIEWER_ID)), review_for(submission.id))
        .await
        .unwrap();
    let review = app.store.get_review(submitted.review_id).await.unwrap().unwrap();

    let public = app
        .state
        .reviews
        .get_review_by_token(review.id, Some(&review.access_token))
        .await
        .unwrap();
    assert_eq!(public.summary, "A promising single");

    let wrong = app
        .state
        .reviews
        .get_review_by_token(review.id, Some("0000"))
        .await
        .unwrap_err();
    assert!(matches!(wrong, ServiceError::PermissionDenied(_)));

    let missing = app.state.reviews.get_review_by_token(review.id, None).await.unwrap_err();
    assert!(matches!(missing, ServiceError::PermissionDenied(_)));

    let unknown = app
        .state
        .reviews
        .get_review_by_token(uuid::Uuid::new_v4(), Some(&review.access_token))
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_reviews_yield_one_success() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_double", REVIEWER_ID, 2500).await;
    let caller = reviewer(REVIEWER_ID);

    let (a, b) = tokio::join!(
        app.state.reviews.submit_review(Some(&caller), review_for(submission.id)),
        app.state.reviews.submit_review(Some(&caller), review_for(submission.id)),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ServiceError::AlreadyExists(_)))));

    let reviews = app.store.list_reviews_by_reviewer(REVIEWER_ID).await.unwrap();
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_review_preconditions_in_order() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_order", REVIEWER_ID, 2500).await;

    let err = app
        .state
        .reviews
        .submit_review(None, review_for(submission.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated(_)));

    let err = app
        .state
        .reviews
        .submit_review(Some(&artist()), review_for(submission.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let mut invalid = review_for(submission.id);
    invalid.overall_score = 11.0;
    let err = app
        .state
        .reviews
        .submit_review(Some(&reviewer(REVIEWER_ID)), invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let err = app
        .state
        .reviews
        .submit_review(Some(&reviewer(REVIEWER_ID)), review_for(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .state
        .reviews
        .submit_review(Some(&reviewer("rev_other")), review_for(submission.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_rejected_submission_cannot_be_reviewed() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_rejected", REVIEWER_ID, 2500).await;

    app.state
        .submissions
        .update_status(Some(&admin()), submission.id, "rejected")
        .await
        .unwrap();

    let err = app
        .state
        .reviews
        .submit_review(Some(&reviewer(REVIEWER_ID)), review_for(submission.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));
}

#[tokio::test]
async fn test_admin_reviews_on_behalf_of_assigned_reviewer() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_behalf", REVIEWER_ID, 2500).await;

    let err = app
        .state
        .reviews
        .submit_review_on_behalf(
            Some(&reviewer(REVIEWER_ID)),
            SubmitReviewOnBehalfDto {
                reviewer_id: REVIEWER_ID.to_string(),
                review: review_for(submission.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let submitted = app
        .state
        .reviews
        .submit_review_on_behalf(
            Some(&admin()),
            SubmitReviewOnBehalfDto {
                reviewer_id: REVIEWER_ID.to_string(),
                review: review_for(submission.id),
            },
        )
        .await
        .unwrap();

    let review = app.store.get_review(submitted.review_id).await.unwrap().unwrap();
    assert_eq!(review.reviewer_id, REVIEWER_ID);
}

#[tokio::test]
async fn test_status_lookup_by_tracking_token() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_lookup", REVIEWER_ID, 2500).await;

    let lookup = app
        .state
        .submissions
        .lookup_status(StatusLookupDto {
            tracking_token: submission.tracking_token.clone(),
            uploader_email: "jane@example.com".to_string(),
        })
        .await
        .unwrap();
    match lookup {
        StatusLookup::Single { submission: view } => {
            assert_eq!(view.id, submission.id);
            assert!(view.review.is_none());
        }
        other => panic!("expected a single match, got {:?}", other),
    }

    let submitted = app
        .state
        .reviews
        .submit_review(Some(&reviewer(REVIEWER_ID)), review_for(submission.id))
        .await
        .unwrap();

    let lookup = app
        .state
        .submissions
        .lookup_status(StatusLookupDto {
            tracking_token: submission.tracking_token.clone(),
            uploader_email: "jane@example.com".to_string(),
        })
        .await
        .unwrap();
    match lookup {
        StatusLookup::Single { submission: view } => {
            assert_eq!(view.status, SubmissionStatus::Completed);
            assert_eq!(view.review.map(|r| r.review_url), Some(submitted.review_url));
        }
        other => panic!("expected a single match, got {:?}", other),
    }

    let err = app
        .state
        .submissions
        .lookup_status(StatusLookupDto {
            tracking_token: submission.tracking_token.clone(),
            uploader_email: "someone.else@example.com".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_reviewer_sees_only_own_submissions() {
    let app = TestApp::new();
    app.paid_submission("pi_mine", REVIEWER_ID, 2500).await;
    app.paid_submission("pi_theirs", "rev_2", 2500).await;

    let mine = app
        .state
        .submissions
        .list(Some(&reviewer(REVIEWER_ID)), Default::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].reviewer_id, REVIEWER_ID);

    let all = app
        .state
        .submissions
        .list(Some(&admin()), Default::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_listing_rejects_out_of_range_page() {
    let app = TestApp::new();
    app.paid_submission("pi_paging", REVIEWER_ID, 2500).await;

    for page in [0, 10_001, usize::MAX] {
        let err = app
            .state
            .submissions
            .list(
                Some(&admin()),
                SubmissionQueryDto { page: Some(page), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "page {}", page);
    }

    let last = app
        .state
        .submissions
        .list(
            Some(&admin()),
            SubmissionQueryDto { page: Some(10_000), limit: Some(100), ..Default::default() },
        )
        .await
        .unwrap();
    assert!(last.is_empty());
}

#[tokio::test]
async fn test_admin_status_update_is_forward_only() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_admin_status", REVIEWER_ID, 2500).await;

    let err = app
        .state
        .submissions
        .update_status(Some(&admin()), submission.id, "Completed")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let err = app
        .state
        .submissions
        .update_status(Some(&admin()), submission.id, "pending")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::FailedPrecondition(_)));

    let err = app
        .state
        .submissions
        .update_status(Some(&reviewer(REVIEWER_ID)), submission.id, "rejected")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}
