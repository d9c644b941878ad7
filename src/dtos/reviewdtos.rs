use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::reviewmodel::{Review, Scores, SubmissionSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewDto {
    pub submission_id: Uuid,

    #[validate(length(min = 1, message = "at least one score is required"))]
    pub scores: BTreeMap<String, f64>,

    pub overall_score: f64,

    #[validate(length(min = 1, max = 5000, message = "strengths must be between 1-5000 characters"))]
    pub strengths: String,

    #[validate(length(min = 1, max = 5000, message = "improvements must be between 1-5000 characters"))]
    pub improvements: String,

    #[validate(length(min = 1, max = 5000, message = "summary must be between 1-5000 characters"))]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewOnBehalfDto {
    #[validate(length(min = 1, message = "reviewerId is required"))]
    pub reviewer_id: String,

    #[serde(flatten)]
    pub review: SubmitReviewDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmittedDto {
    pub review_id: Uuid,
    pub review_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewTokenQuery {
    pub token: Option<String>,
}

/// Public projection of a review: no reviewer identity, no access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicReviewDto {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub scores: Scores,
    pub overall_score: f64,
    pub strengths: String,
    pub improvements: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub submission_details: SubmissionSnapshot,
}

impl PublicReviewDto {
    pub fn from_review(review: &Review) -> Self {
        PublicReviewDto {
            id: review.id,
            submission_id: review.submission_id,
            scores: review.scores.0.clone(),
            overall_score: review.overall_score,
            strengths: review.strengths.clone(),
            improvements: review.improvements.clone(),
            summary: review.summary.clone(),
            created_at: review.created_at,
            submission_details: review.submission_details.0.clone(),
        }
    }
}

/// A reviewer's own review, access token excluded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterReviewDto {
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

impl FilterReviewDto {
    pub fn filter_review(review: &Review) -> Self {
        FilterReviewDto {
            id: review.id,
            submission_id: review.submission_id,
            reviewer_id: review.reviewer_id.clone(),
            scores: review.scores.0.clone(),
            overall_score: review.overall_score,
            strengths: review.strengths.clone(),
            improvements: review.improvements.clone(),
            summary: review.summary.clone(),
            created_at: review.created_at,
            submission_details: review.submission_details.0.clone(),
        }
    }
}
