use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "submission_status")]
pub enum SubmissionStatus {
    #[serde(rename = "pending")]
    #[sqlx(rename = "pending")]
    Pending,
    #[serde(rename = "Pending Review")]
    #[sqlx(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "Completed")]
    #[sqlx(rename = "Completed")]
    Completed,
    #[serde(rename = "rejected")]
    #[sqlx(rename = "rejected")]
    Rejected,
}

impl SubmissionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::PendingReview => "Pending Review",
            SubmissionStatus::Completed => "Completed",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Completed | SubmissionStatus::Rejected)
    }

    /// Forward-only: pending -> Pending Review -> {Completed | rejected}.
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Pending, SubmissionStatus::PendingReview)
                | (SubmissionStatus::Pending, SubmissionStatus::Rejected)
                | (SubmissionStatus::PendingReview, SubmissionStatus::Completed)
                | (SubmissionStatus::PendingReview, SubmissionStatus::Rejected)
        )
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "pending review" | "pending_review" => Ok(SubmissionStatus::PendingReview),
            "completed" => Ok(SubmissionStatus::Completed),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status: {}", other)),
        }
    }
}

/// Payment-side flag. Refunds and disputes are recorded, never acted upon.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Refunded,
    Disputed,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub artist_name: String,
    pub song_title: String,
    pub contact_email: String,
    pub audio_url: String,
    pub genre: String,
    pub reviewer_id: String,
    pub package_id: String,
    pub payment_intent_id: String,
    pub tracking_token: String,
    pub amount: i64,
    pub currency: String,
    pub status: SubmissionStatus,
    pub payment_status: PaymentStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_id: Option<Uuid>,
}

/// Validated input for a new submission, built from checkout metadata.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[validate(length(min = 1, max = 200, message = "artistName must be between 1-200 characters"))]
    pub artist_name: String,

    #[validate(length(min = 1, max = 200, message = "songTitle must be between 1-200 characters"))]
    pub song_title: String,

    #[validate(email(message = "contactEmail is invalid"))]
    pub contact_email: String,

    #[validate(url(message = "audioUrl must be a valid URL"))]
    pub audio_url: String,

    #[validate(length(min = 1, max = 100, message = "genre must be between 1-100 characters"))]
    pub genre: String,

    #[validate(length(min = 1, message = "reviewerId is required"))]
    pub reviewer_id: String,

    #[validate(length(min = 1, message = "packageId is required"))]
    pub package_id: String,

    #[validate(length(min = 1, message = "payment intent is required"))]
    pub payment_intent_id: String,

    pub tracking_token: String,

    #[validate(range(min = 0, message = "amount cannot be negative"))]
    pub amount: i64,

    pub currency: String,
}

impl NewSubmission {
    pub fn into_submission(self, id: Uuid, submitted_at: DateTime<Utc>) -> Submission {
        Submission {
            id,
            artist_name: self.artist_name,
            song_title: self.song_title,
            contact_email: self.contact_email,
            audio_url: self.audio_url,
            genre: self.genre,
            reviewer_id: self.reviewer_id,
            package_id: self.package_id,
            payment_intent_id: self.payment_intent_id,
            tracking_token: self.tracking_token,
            amount: self.amount,
            currency: self.currency,
            status: SubmissionStatus::PendingReview,
            payment_status: PaymentStatus::Paid,
            submitted_at,
            reviewed_at: None,
            review_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_forward_only() {
        use SubmissionStatus::*;

        assert!(Pending.can_transition_to(PendingReview));
        assert!(PendingReview.can_transition_to(Completed));
        assert!(PendingReview.can_transition_to(Rejected));

        assert!(!PendingReview.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(PendingReview));
        assert!(!Completed.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(PendingReview));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        use SubmissionStatus::*;

        for terminal in [Completed, Rejected] {
            assert!(terminal.is_terminal());
            for next in [Pending, PendingReview, Completed, Rejected] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::PendingReview).unwrap(),
            "\"Pending Review\""
        );
        assert_eq!("Pending Review".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::PendingReview);
        assert_eq!("completed".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Completed);
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }
}
