use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REFERRAL_CODE_PREFIX: &str = "INVITE-";
pub const REFERRAL_CODE_LENGTH: usize = 8;
pub const REFERRAL_CODE_TTL_HOURS: i64 = 24;
pub const DAILY_CODE_LIMIT: i64 = 10;
pub const COMMISSION_PERCENT: i64 = 7;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "referral_code_status")]
pub enum ReferralCodeStatus {
    Active,
    Used,
    Expired,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub id: Uuid,
    pub code: String,
    pub referrer_id: String,
    pub associated_user: String,
    pub status: ReferralCodeStatus,
    pub created_at: DateTime<Utc>,
    pub used_by: Option<String>,
    pub used_by_email: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
}

impl ReferralCode {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(REFERRAL_CODE_TTL_HOURS)
    }

    /// Status as observed at `now`; an unused code past its TTL reads as expired
    /// whatever the stored status says.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ReferralCodeStatus {
        match self.status {
            ReferralCodeStatus::Active if now >= self.expires_at() => ReferralCodeStatus::Expired,
            status => status,
        }
    }
}

/// Oldest `created_at` a code may have and still be redeemable at `now`.
pub fn redeemable_since(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(REFERRAL_CODE_TTL_HOURS)
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "earning_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EarningStatus {
    Pending,
    Paid,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "earning_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EarningType {
    ReviewFee,
    Bonus,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralEarning {
    pub id: Uuid,
    pub referrer_id: String,
    pub referred_user_id: String,
    pub referred_user_name: String,
    pub referred_user_email: String,
    pub original_amount: i64,
    pub commission_amount: i64,
    pub review_id: Uuid,
    pub earning_type: EarningType,
    pub status: EarningStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub referrer_id: String,
    pub total_earned: i64,
    pub total_reviews: i64,
    pub updated_at: DateTime<Utc>,
}

/// round(amount * 0.07) in integer cents, halves rounded up. `None` on overflow.
pub fn commission_for(amount_in_cents: i64) -> Option<i64> {
    amount_in_cents
        .checked_mul(COMMISSION_PERCENT)?
        .checked_add(50)
        .map(|scaled| scaled.div_euclid(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_created_at(created_at: DateTime<Utc>, status: ReferralCodeStatus) -> ReferralCode {
        ReferralCode {
            id: Uuid::new_v4(),
            code: "INVITE-AB12CD34".to_string(),
            referrer_id: "rev_1".to_string(),
            associated_user: "friend@example.com".to_string(),
            status,
            created_at,
            used_by: None,
            used_by_email: None,
            used_at: None,
        }
    }

    #[test]
    fn test_commission_for() {
        assert_eq!(commission_for(1000), Some(70));
        assert_eq!(commission_for(2500), Some(175));
        assert_eq!(commission_for(1050), Some(74)); // 73.5 rounds up
        assert_eq!(commission_for(7), Some(0)); // 0.49
        assert_eq!(commission_for(8), Some(1)); // 0.56
        assert_eq!(commission_for(0), Some(0));
    }

    #[test]
    fn test_commission_overflow_is_reported() {
        assert_eq!(commission_for(i64::MAX / 2), None);
        assert_eq!(commission_for(i64::MAX / 7 + 1), None);
        assert_eq!(commission_for(1_000_000_000), Some(70_000_000));
    }

    #[test]
    fn test_effective_status_expires_after_ttl() {
        let now = Utc::now();

        let fresh = code_created_at(now - Duration::hours(23), ReferralCodeStatus::Active);
        assert_eq!(fresh.effective_status(now), ReferralCodeStatus::Active);

        let stale = code_created_at(now - Duration::hours(24) - Duration::seconds(1), ReferralCodeStatus::Active);
        assert_eq!(stale.effective_status(now), ReferralCodeStatus::Expired);
    }

    #[test]
    fn test_code_expires_at_exactly_ttl() {
        let now = Utc::now();

        let boundary = code_created_at(now - Duration::hours(24), ReferralCodeStatus::Active);
        assert_eq!(boundary.effective_status(now), ReferralCodeStatus::Expired);

        let almost = code_created_at(now - Duration::hours(24) + Duration::seconds(1), ReferralCodeStatus::Active);
        assert_eq!(almost.effective_status(now), ReferralCodeStatus::Active);
    }

    #[test]
    fn test_terminal_statuses_are_kept() {
        let long_ago = Utc::now() - Duration::days(30);

        let used = code_created_at(long_ago, ReferralCodeStatus::Used);
        assert_eq!(used.effective_status(Utc::now()), ReferralCodeStatus::Used);

        let expired = code_created_at(Utc::now(), ReferralCodeStatus::Expired);
        assert_eq!(expired.effective_status(Utc::now()), ReferralCodeStatus::Expired);
    }
}
