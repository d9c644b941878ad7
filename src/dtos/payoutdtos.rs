use serde::{Deserialize, Serialize};

use crate::models::payoutmodel::{PayoutReviewItem, ReviewerSnapshot};

/// Every field is optional on the wire so that a missing one is reported
/// as an invalid argument rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutDto {
    pub reviewer_id: Option<String>,
    pub reviewer: Option<ReviewerSnapshot>,
    pub amount_in_cents: Option<i64>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub reviews: Vec<PayoutReviewItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePayoutStatusDto {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutQueryDto {
    pub reviewer_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSummaryDto {
    pub reviewer_id: String,
    pub unpaid_reviews: Vec<PayoutReviewItem>,
    pub total_in_cents: i64,
    pub total: String,
}
