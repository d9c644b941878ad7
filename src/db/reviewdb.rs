// db/reviewdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::{submissiondb::SUBMISSION_COLUMNS, DBClient, StoreError};
use crate::models::{
    reviewmodel::{NewReview, Review},
    submissionmodel::{Submission, SubmissionStatus},
};

const REVIEW_COLUMNS: &str = r#"
    id, submission_id, reviewer_id, scores, overall_score, strengths,
    improvements, summary, created_at, access_token, submission_details
"#;

/// Result of the review-completion unit of work.
#[derive(Debug, Clone)]
pub enum ReviewCompletion {
    Completed { review: Review, submission: Submission },
    SubmissionMissing,
    AlreadyReviewed,
    WrongStatus(SubmissionStatus),
}

#[async_trait]
pub trait ReviewExt: Send + Sync {
    /// Atomically re-checks the single-review rule and submission status, inserts
    /// the review, attaches `access_token`, and flips the submission to Completed.
    /// Either every effect is visible afterwards or none is.
    async fn complete_review(
        &self,
        review: NewReview,
        access_token: String,
        completed_at: DateTime<Utc>,
    ) -> Result<ReviewCompletion, StoreError>;

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, StoreError>;

    async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: &str,
    ) -> Result<Option<Review>, StoreError>;

    async fn list_reviews_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<Review>, StoreError>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn complete_review(
        &self,
        review: NewReview,
        access_token: String,
        completed_at: DateTime<Utc>,
    ) -> Result<ReviewCompletion, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(SubmissionStatus,)> = sqlx::query_as(
            "SELECT status FROM submissions WHERE id = $1 FOR UPDATE",
        )
        .bind(review.submission_id)
        .fetch_optional(&mut *tx)
        .await?;

        let status = match current {
            Some((status,)) => status,
            None => return Ok(ReviewCompletion::SubmissionMissing),
        };

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM reviews WHERE submission_id = $1 AND reviewer_id = $2",
        )
        .bind(review.submission_id)
        .bind(&review.reviewer_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Ok(ReviewCompletion::AlreadyReviewed);
        }

        if status != SubmissionStatus::PendingReview {
            return Ok(ReviewCompletion::WrongStatus(status));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (
                id, submission_id, reviewer_id, scores, overall_score,
                strengths, improvements, summary, created_at, submission_details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(review.id)
        .bind(review.submission_id)
        .bind(&review.reviewer_id)
        .bind(Json(&review.scores))
        .bind(review.overall_score)
        .bind(&review.strengths)
        .bind(&review.improvements)
        .bind(&review.summary)
        .bind(review.created_at)
        .bind(Json(&review.submission_details))
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_insert);

        match inserted {
            Ok(_) => {}
            // A concurrent writer won the unique (submission_id, reviewer_id) slot.
            Err(StoreError::Conflict(_)) => return Ok(ReviewCompletion::AlreadyReviewed),
            Err(e) => return Err(e),
        }

        let submission_query = format!(
            r#"
            UPDATE submissions
            SET status = $2, reviewed_at = $3, review_id = $4
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<_, Submission>(&submission_query)
            .bind(review.submission_id)
            .bind(SubmissionStatus::Completed)
            .bind(completed_at)
            .bind(review.id)
            .fetch_one(&mut *tx)
            .await?;

        let review_query = format!(
            "UPDATE reviews SET access_token = $2 WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        );

        let review = sqlx::query_as::<_, Review>(&review_query)
            .bind(review.id)
            .bind(&access_token)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReviewCompletion::Completed { review, submission })
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, StoreError> {
        let query = format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS);

        let review = sqlx::query_as::<_, Review>(&query)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let query = format!(
            "SELECT {} FROM reviews WHERE submission_id = $1 AND reviewer_id = $2",
            REVIEW_COLUMNS
        );

        let review = sqlx::query_as::<_, Review>(&query)
            .bind(submission_id)
            .bind(reviewer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn list_reviews_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<Review>, StoreError> {
        let query = format!(
            "SELECT {} FROM reviews WHERE reviewer_id = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        );

        let reviews = sqlx::query_as::<_, Review>(&query)
            .bind(reviewer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }
}
