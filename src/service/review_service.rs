// service/review_service.rs
use std::sync::Arc;

use chrono::Utc;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        reviewdb::{ReviewCompletion, ReviewExt},
        submissiondb::SubmissionExt,
        StoreHandle,
    },
    dtos::reviewdtos::{PublicReviewDto, ReviewSubmittedDto, SubmitReviewDto, SubmitReviewOnBehalfDto},
    models::{
        reviewmodel::{score_in_range, NewReview, Review, SubmissionSnapshot, MAX_SCORE, MIN_SCORE},
        submissionmodel::SubmissionStatus,
        usermodel::Caller,
    },
    service::{error::ServiceError, notification_service::NotificationService},
    utils::secure_token::generate_secure_token,
};

pub fn review_url(app_url: &str, review_id: Uuid, access_token: &str) -> String {
    format!(
        "{}/review/{}?token={}",
        app_url.trim_end_matches('/'),
        review_id,
        urlencoding::encode(access_token)
    )
}

pub struct ReviewService {
    store: StoreHandle,
    notifications: Arc<NotificationService>,
    app_url: String,
}

fn validate_review(review: &SubmitReviewDto) -> Result<(), ServiceError> {
    review.validate()?;

    if !score_in_range(review.overall_score) {
        return Err(ServiceError::InvalidArgument(format!(
            "overallScore must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    for (category, score) in &review.scores {
        if category.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("score categories must be named".to_string()));
        }
        if !score_in_range(*score) {
            return Err(ServiceError::InvalidArgument(format!(
                "score for {} must be between {} and {}",
                category, MIN_SCORE, MAX_SCORE
            )));
        }
    }

    Ok(())
}

impl ReviewService {
    pub fn new(store: StoreHandle, notifications: Arc<NotificationService>, app_url: String) -> Self {
        Self {
            store,
            notifications,
            app_url,
        }
    }

    /// The calling reviewer reviews a submission assigned to them.
    pub async fn submit_review(
        &self,
        caller: Option<&Caller>,
        review: SubmitReviewDto,
    ) -> Result<ReviewSubmittedDto, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_reviewer_or_admin() {
            return Err(ServiceError::PermissionDenied(
                "Only reviewers can submit reviews".to_string(),
            ));
        }

        let reviewer_id = caller.uid.clone();
        self.complete(&reviewer_id, review).await
    }

    /// An admin records a review on behalf of the assigned reviewer.
    pub async fn submit_review_on_behalf(
        &self,
        caller: Option<&Caller>,
        request: SubmitReviewOnBehalfDto,
    ) -> Result<ReviewSubmittedDto, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_admin() {
            return Err(ServiceError::PermissionDenied(
                "Only admins can submit reviews on behalf of a reviewer".to_string(),
            ));
        }
        request.validate()?;

        tracing::info!(
            "Admin {} submitting review on behalf of {} for submission {}",
            caller.uid,
            request.reviewer_id,
            request.review.submission_id
        );

        self.complete(&request.reviewer_id, request.review).await
    }

    async fn complete(&self, reviewer_id: &str, review: SubmitReviewDto) -> Result<ReviewSubmittedDto, ServiceError> {
        validate_review(&review)?;

        let submission = self
            .store
            .get_submission(review.submission_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Submission {} not found", review.submission_id)))?;

        if submission.reviewer_id != reviewer_id {
            return Err(ServiceError::PermissionDenied(
                "This submission is assigned to another reviewer".to_string(),
            ));
        }

        if submission.status != SubmissionStatus::PendingReview {
            // A finished submission that this reviewer already reviewed is a duplicate, not a state error.
            if self.store.find_review(submission.id, reviewer_id).await?.is_some() {
                return Err(ServiceError::AlreadyExists(
                    "You have already reviewed this submission".to_string(),
                ));
            }
            return Err(ServiceError::FailedPrecondition(format!(
                "Submission is {}, not Pending Review",
                submission.status.to_str()
            )));
        }

        if self.store.find_review(submission.id, reviewer_id).await?.is_some() {
            return Err(ServiceError::AlreadyExists(
                "You have already reviewed this submission".to_string(),
            ));
        }

        let now = Utc::now();
        let new_review = NewReview {
            id: Uuid::new_v4(),
            submission_id: submission.id,
            reviewer_id: reviewer_id.to_string(),
            scores: review.scores,
            overall_score: review.overall_score,
            strengths: review.strengths.trim().to_string(),
            improvements: review.improvements.trim().to_string(),
            summary: review.summary.trim().to_string(),
            created_at: now,
            submission_details: SubmissionSnapshot {
                artist_name: submission.artist_name.clone(),
                song_title: submission.song_title.clone(),
                genre: submission.genre.clone(),
            },
        };

        let outcome = self
            .store
            .complete_review(new_review, generate_secure_token(), now)
            .await?;

        let (review, submission) = match outcome {
            ReviewCompletion::Completed { review, submission } => (review, submission),
            ReviewCompletion::SubmissionMissing => {
                return Err(ServiceError::NotFound(format!("Submission {} not found", submission.id)));
            }
            ReviewCompletion::AlreadyReviewed => {
                return Err(ServiceError::AlreadyExists(
                    "You have already reviewed this submission".to_string(),
                ));
            }
            ReviewCompletion::WrongStatus(status) => {
                return Err(ServiceError::FailedPrecondition(format!(
                    "Submission is {}, not Pending Review",
                    status.to_str()
                )));
            }
        };

        let url = review_url(&self.app_url, review.id, &review.access_token);

        tracing::info!(
            "Review {} completed submission {} (reviewer {})",
            review.id,
            submission.id,
            review.reviewer_id
        );

        self.notifications.notify_artist_review_ready(&submission, &url).await;

        Ok(ReviewSubmittedDto {
            review_id: review.id,
            review_url: url,
        })
    }

    /// Public read gated by the review's access token.
    pub async fn get_review_by_token(
        &self,
        review_id: Uuid,
        token: Option<&str>,
    ) -> Result<PublicReviewDto, ServiceError> {
        let review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", review_id)))?;

        let supplied = token.unwrap_or_default();
        let matches = !review.access_token.is_empty()
            && bool::from(supplied.as_bytes().ct_eq(review.access_token.as_bytes()));

        if !matches {
            return Err(ServiceError::PermissionDenied(
                "Invalid or missing review access token".to_string(),
            ));
        }

        Ok(PublicReviewDto::from_review(&review))
    }

    pub async fn list_own_reviews(&self, caller: Option<&Caller>) -> Result<Vec<Review>, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_reviewer_or_admin() {
            return Err(ServiceError::PermissionDenied(
                "Only reviewers have reviews".to_string(),
            ));
        }

        Ok(self.store.list_reviews_by_reviewer(&caller.uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_with(overall: f64, scores: &[(&str, f64)]) -> SubmitReviewDto {
        SubmitReviewDto {
            submission_id: Uuid::new_v4(),
            scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            overall_score: overall,
            strengths: "Great hook".to_string(),
            improvements: "Tighten the mix".to_string(),
            summary: "Strong single".to_string(),
        }
    }

    #[test]
    fn test_review_url_shape() {
        let id = Uuid::nil();
        assert_eq!(
            review_url("https://app.example.com/", id, "abc123"),
            "https://app.example.com/review/00000000-0000-0000-0000-000000000000?token=abc123"
        );
    }

    #[test]
    fn test_validate_review_bounds() {
        assert!(validate_review(&review_with(8.5, &[("mix", 7.0)])).is_ok());
        assert!(validate_review(&review_with(10.5, &[("mix", 7.0)])).is_err());
        assert!(validate_review(&review_with(8.0, &[("mix", -1.0)])).is_err());
        assert!(validate_review(&review_with(8.0, &[])).is_err());
        assert!(validate_review(&review_with(8.0, &[(" ", 5.0)])).is_err());
    }
}
