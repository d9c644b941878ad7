use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payout_status")]
pub enum PayoutStatus {
    Pending,
    Paid,
}

impl PayoutStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PayoutStatus::Pending => "Pending",
            PayoutStatus::Paid => "Paid",
        }
    }
}

/// Reviewer identity copied onto the payout at creation time.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerSnapshot {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReviewItem {
    pub id: String,
    pub artist: String,
    pub song: String,
    pub date: DateTime<Utc>,
    pub fee: i64,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: Uuid,
    pub reviewer_id: String,
    pub reviewer: Json<ReviewerSnapshot>,
    pub amount: String,
    pub amount_in_cents: i64,
    pub payment_method: String,
    pub reviews: Json<Vec<PayoutReviewItem>>,
    pub status: PayoutStatus,
    pub date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}
