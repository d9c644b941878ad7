use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::referralmodel::{
    EarningType, ReferralCode, ReferralCodeStatus, ReferralEarning, ReferralStats,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralCodeDto {
    #[validate(length(min = 1, max = 320, message = "associatedUser is required"))]
    pub associated_user: String,

    /// Admins may generate on behalf of a reviewer; reviewers always generate for themselves.
    pub referrer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCodeDto {
    pub id: Uuid,
    pub code: String,
    pub referrer_id: String,
    pub associated_user: String,
    pub status: ReferralCodeStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<String>,
    pub used_by_email: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
}

impl ReferralCodeDto {
    /// `status` is the effective status at `now`.
    pub fn at(code: &ReferralCode, now: DateTime<Utc>) -> Self {
        ReferralCodeDto {
            id: code.id,
            code: code.code.clone(),
            referrer_id: code.referrer_id.clone(),
            associated_user: code.associated_user.clone(),
            status: code.effective_status(now),
            created_at: code.created_at,
            expires_at: code.expires_at(),
            used_by: code.used_by.clone(),
            used_by_email: code.used_by_email.clone(),
            used_at: code.used_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemReferralCodeDto {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,

    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    #[validate(email(message = "userEmail is invalid"))]
    pub user_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEarningsDto {
    #[validate(length(min = 1, message = "reviewerId is required"))]
    pub reviewer_id: String,

    #[validate(range(min = 0, max = 1_000_000_000, message = "amount must be between 0 and 1000000000 cents"))]
    pub amount: i64,

    pub review_id: Uuid,

    #[serde(rename = "type", default)]
    pub earning_type: Option<EarningType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AccrualOutcome {
    Accrued { earning: ReferralEarning },
    /// The reviewer joined without a referral; nothing to credit.
    NoReferrer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQueryDto {
    pub referrer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EarningsOverviewDto {
    pub referrer_id: String,
    pub total_earned: i64,
    pub total_reviews: i64,
    pub earnings: Vec<ReferralEarning>,
}

impl EarningsOverviewDto {
    pub fn new(referrer_id: &str, stats: Option<ReferralStats>, earnings: Vec<ReferralEarning>) -> Self {
        let (total_earned, total_reviews) = stats
            .map(|s| (s.total_earned, s.total_reviews))
            .unwrap_or((0, 0));

        EarningsOverviewDto {
            referrer_id: referrer_id.to_string(),
            total_earned,
            total_reviews,
            earnings,
        }
    }
}
