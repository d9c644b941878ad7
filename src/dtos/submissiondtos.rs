use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::submissionmodel::{PaymentStatus, Submission, SubmissionStatus};

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQueryDto {
    pub reviewer_id: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 1, max = 10_000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusLookupDto {
    #[validate(length(min = 1, message = "trackingToken is required"))]
    pub tracking_token: String,

    #[validate(
        length(min = 1, message = "uploaderEmail is required"),
        email(message = "uploaderEmail is invalid")
    )]
    pub uploader_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSubmissionStatusDto {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

/// Submission as shown to reviewers and admins. The tracking token stays private
/// to the artist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSubmissionDto {
    pub id: Uuid,
    pub artist_name: String,
    pub song_title: String,
    pub contact_email: String,
    pub audio_url: String,
    pub genre: String,
    pub reviewer_id: String,
    pub package_id: String,
    pub payment_intent_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: SubmissionStatus,
    pub payment_status: PaymentStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_id: Option<Uuid>,
}

impl FilterSubmissionDto {
    pub fn filter_submission(submission: &Submission) -> Self {
        FilterSubmissionDto {
            id: submission.id,
            artist_name: submission.artist_name.clone(),
            song_title: submission.song_title.clone(),
            contact_email: submission.contact_email.clone(),
            audio_url: submission.audio_url.clone(),
            genre: submission.genre.clone(),
            reviewer_id: submission.reviewer_id.clone(),
            package_id: submission.package_id.clone(),
            payment_intent_id: submission.payment_intent_id.clone(),
            amount: submission.amount,
            currency: submission.currency.clone(),
            status: submission.status,
            payment_status: submission.payment_status,
            submitted_at: submission.submitted_at,
            reviewed_at: submission.reviewed_at,
            review_id: submission.review_id,
        }
    }

    pub fn filter_submissions(submissions: &[Submission]) -> Vec<FilterSubmissionDto> {
        submissions.iter().map(FilterSubmissionDto::filter_submission).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLinkDto {
    pub review_id: Uuid,
    pub overall_score: f64,
    pub review_url: String,
}

/// What an artist sees when checking status without an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusView {
    pub id: Uuid,
    pub artist_name: String,
    pub song_title: String,
    pub genre: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review: Option<ReviewLinkDto>,
}

impl SubmissionStatusView {
    pub fn new(submission: &Submission, review: Option<ReviewLinkDto>) -> Self {
        SubmissionStatusView {
            id: submission.id,
            artist_name: submission.artist_name.clone(),
            song_title: submission.song_title.clone(),
            genre: submission.genre.clone(),
            status: submission.status,
            submitted_at: submission.submitted_at,
            reviewed_at: submission.reviewed_at,
            review,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum StatusLookup {
    Single { submission: SubmissionStatusView },
    Multiple { submissions: Vec<SubmissionStatusView> },
}
