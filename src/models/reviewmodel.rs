use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

pub type Scores = BTreeMap<String, f64>;

/// Point-in-time copy of the reviewed track. Later edits to the submission
/// are not reflected here.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    pub artist_name: String,
    pub song_title: String,
    pub genre: String,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub reviewer_id: String,
    pub scores: Json<Scores>,
    pub overall_score: f64,
    pub strengths: String,
    pub improvements: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub access_token: String,
    pub submission_details: Json<SubmissionSnapshot>,
}

/// Review content before the store assigns the access token.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub reviewer_id: String,
    pub scores: Scores,
    pub overall_score: f64,
    pub strengths: String,
    pub improvements: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub submission_details: SubmissionSnapshot,
}

impl NewReview {
    pub fn with_access_token(self, access_token: String) -> Review {
        Review {
            id: self.id,
            submission_id: self.submission_id,
            reviewer_id: self.reviewer_id,
            scores: Json(self.scores),
            overall_score: self.overall_score,
            strengths: self.strengths,
            improvements: self.improvements,
            summary: self.summary,
            created_at: self.created_at,
            access_token,
            submission_details: Json(self.submission_details),
        }
    }
}

pub fn score_in_range(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_in_range() {
        assert!(score_in_range(0.0));
        assert!(score_in_range(8.5));
        assert!(score_in_range(10.0));
        assert!(!score_in_range(10.01));
        assert!(!score_in_range(-0.5));
        assert!(!score_in_range(f64::NAN));
    }
}
