// db/submissiondb.rs
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{DBClient, StoreError};
use crate::models::submissionmodel::{NewSubmission, PaymentStatus, Submission, SubmissionStatus};

pub(super) const SUBMISSION_COLUMNS: &str = r#"
    id, artist_name, song_title, contact_email, audio_url, genre,
    reviewer_id, package_id, payment_intent_id, tracking_token,
    amount, currency, status, payment_status, submitted_at, reviewed_at, review_id
"#;

#[async_trait]
pub trait SubmissionExt: Send + Sync {
    /// Inserts unless a submission with the same payment intent exists.
    /// Returns `None` for the duplicate case.
    async fn insert_submission_if_absent(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<Submission>, StoreError>;

    async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>, StoreError>;

    async fn get_submission_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Submission>, StoreError>;

    async fn find_submissions_by_tracking(
        &self,
        tracking_token: &str,
        contact_email: &str,
    ) -> Result<Vec<Submission>, StoreError>;

    async fn list_submissions(
        &self,
        reviewer_id: Option<&str>,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, StoreError>;

    /// Compare-and-set on status. `None` when the stored status is no longer `from`.
    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> Result<Option<Submission>, StoreError>;

    async fn set_payment_status(
        &self,
        payment_intent_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Submission>, StoreError>;
}

#[async_trait]
impl SubmissionExt for DBClient {
    async fn insert_submission_if_absent(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<Submission>, StoreError> {
        let query = format!(
            r#"
            INSERT INTO submissions (
                id, artist_name, song_title, contact_email, audio_url, genre,
                reviewer_id, package_id, payment_intent_id, tracking_token,
                amount, currency, status, payment_status, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (payment_intent_id) DO NOTHING
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let created = sqlx::query_as::<_, Submission>(&query)
            .bind(Uuid::new_v4())
            .bind(&submission.artist_name)
            .bind(&submission.song_title)
            .bind(&submission.contact_email)
            .bind(&submission.audio_url)
            .bind(&submission.genre)
            .bind(&submission.reviewer_id)
            .bind(&submission.package_id)
            .bind(&submission.payment_intent_id)
            .bind(&submission.tracking_token)
            .bind(submission.amount)
            .bind(&submission.currency)
            .bind(SubmissionStatus::PendingReview)
            .bind(PaymentStatus::Paid)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>, StoreError> {
        let query = format!("SELECT {} FROM submissions WHERE id = $1", SUBMISSION_COLUMNS);

        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    async fn get_submission_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Submission>, StoreError> {
        let query = format!(
            "SELECT {} FROM submissions WHERE payment_intent_id = $1",
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(payment_intent_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    async fn find_submissions_by_tracking(
        &self,
        tracking_token: &str,
        contact_email: &str,
    ) -> Result<Vec<Submission>, StoreError> {
        let query = format!(
            r#"
            SELECT {} FROM submissions
            WHERE tracking_token = $1 AND LOWER(contact_email) = LOWER($2)
            ORDER BY submitted_at DESC
            "#,
            SUBMISSION_COLUMNS
        );

        let submissions = sqlx::query_as::<_, Submission>(&query)
            .bind(tracking_token)
            .bind(contact_email)
            .fetch_all(&self.pool)
            .await?;

        Ok(submissions)
    }

    async fn list_submissions(
        &self,
        reviewer_id: Option<&str>,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, StoreError> {
        let query = format!(
            r#"
            SELECT {} FROM submissions
            WHERE ($1::TEXT IS NULL OR reviewer_id = $1)
              AND ($2::submission_status IS NULL OR status = $2)
            ORDER BY submitted_at DESC
            LIMIT $3 OFFSET $4
            "#,
            SUBMISSION_COLUMNS
        );

        let submissions = sqlx::query_as::<_, Submission>(&query)
            .bind(reviewer_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(submissions)
    }

    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> Result<Option<Submission>, StoreError> {
        let query = format!(
            r#"
            UPDATE submissions SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(submission_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    async fn set_payment_status(
        &self,
        payment_intent_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Submission>, StoreError> {
        let query = format!(
            r#"
            UPDATE submissions SET payment_status = $2
            WHERE payment_intent_id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(payment_intent_id)
            .bind(payment_status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }
}
