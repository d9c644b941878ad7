// db/referraldb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DBClient, StoreError};
use crate::models::referralmodel::{
    EarningStatus, ReferralCode, ReferralCodeStatus, ReferralEarning, ReferralStats,
};

const CODE_COLUMNS: &str = r#"
    id, code, referrer_id, associated_user, status, created_at,
    used_by, used_by_email, used_at
"#;

const EARNING_COLUMNS: &str = r#"
    id, referrer_id, referred_user_id, referred_user_name, referred_user_email,
    original_amount, commission_amount, review_id, earning_type, status, created_at
"#;

#[async_trait]
pub trait ReferralExt: Send + Sync {
    /// Fails with `StoreError::Conflict` when the code string is taken.
    async fn insert_referral_code(&self, code: ReferralCode) -> Result<ReferralCode, StoreError>;

    async fn count_referral_codes_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, StoreError>;

    async fn list_referral_codes(&self, referrer_id: &str) -> Result<Vec<ReferralCode>, StoreError>;

    /// Active -> Expired. No-op for any other stored status.
    async fn expire_referral_code(&self, code_id: Uuid) -> Result<(), StoreError>;

    /// Active -> Used, only while the code was created after `created_after`.
    /// `None` when the code is no longer redeemable.
    async fn redeem_referral_code(
        &self,
        code_id: Uuid,
        used_by: &str,
        used_by_email: &str,
        used_at: DateTime<Utc>,
        created_after: DateTime<Utc>,
    ) -> Result<Option<ReferralCode>, StoreError>;

    /// The code `user_id` redeemed when joining, if any.
    async fn get_redeemed_code_for(&self, user_id: &str) -> Result<Option<ReferralCode>, StoreError>;

    async fn get_earning_by_review(&self, review_id: Uuid) -> Result<Option<ReferralEarning>, StoreError>;

    /// Inserts the earning and bumps the referrer's running stats as one unit.
    /// `None` when an earning for the same review already exists.
    async fn record_referral_earning(
        &self,
        earning: ReferralEarning,
    ) -> Result<Option<ReferralEarning>, StoreError>;

    async fn list_referral_earnings(&self, referrer_id: &str) -> Result<Vec<ReferralEarning>, StoreError>;

    async fn get_referral_stats(&self, referrer_id: &str) -> Result<Option<ReferralStats>, StoreError>;

    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Option<ReferralEarning>, StoreError>;
}

#[async_trait]
impl ReferralExt for DBClient {
    async fn insert_referral_code(&self, code: ReferralCode) -> Result<ReferralCode, StoreError> {
        let query = format!(
            r#"
            INSERT INTO referral_codes (
                id, code, referrer_id, associated_user, status, created_at,
                used_by, used_by_email, used_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CODE_COLUMNS
        );

        let code = sqlx::query_as::<_, ReferralCode>(&query)
            .bind(code.id)
            .bind(&code.code)
            .bind(&code.referrer_id)
            .bind(&code.associated_user)
            .bind(code.status)
            .bind(code.created_at)
            .bind(&code.used_by)
            .bind(&code.used_by_email)
            .bind(code.used_at)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_insert)?;

        Ok(code)
    }

    async fn count_referral_codes_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM referral_codes WHERE referrer_id = $1 AND created_at >= $2",
        )
        .bind(referrer_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, StoreError> {
        let query = format!("SELECT {} FROM referral_codes WHERE code = $1", CODE_COLUMNS);

        let code = sqlx::query_as::<_, ReferralCode>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(code)
    }

    async fn list_referral_codes(&self, referrer_id: &str) -> Result<Vec<ReferralCode>, StoreError> {
        let query = format!(
            "SELECT {} FROM referral_codes WHERE referrer_id = $1 ORDER BY created_at DESC",
            CODE_COLUMNS
        );

        let codes = sqlx::query_as::<_, ReferralCode>(&query)
            .bind(referrer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(codes)
    }

    async fn expire_referral_code(&self, code_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE referral_codes SET status = $2 WHERE id = $1 AND status = $3")
            .bind(code_id)
            .bind(ReferralCodeStatus::Expired)
            .bind(ReferralCodeStatus::Active)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn redeem_referral_code(
        &self,
        code_id: Uuid,
        used_by: &str,
        used_by_email: &str,
        used_at: DateTime<Utc>,
        created_after: DateTime<Utc>,
    ) -> Result<Option<ReferralCode>, StoreError> {
        let query = format!(
            r#"
            UPDATE referral_codes
            SET status = $2, used_by = $3, used_by_email = $4, used_at = $5
            WHERE id = $1 AND status = $6 AND created_at > $7
            RETURNING {}
            "#,
            CODE_COLUMNS
        );

        let code = sqlx::query_as::<_, ReferralCode>(&query)
            .bind(code_id)
            .bind(ReferralCodeStatus::Used)
            .bind(used_by)
            .bind(used_by_email)
            .bind(used_at)
            .bind(ReferralCodeStatus::Active)
            .bind(created_after)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_insert)?;

        Ok(code)
    }

    async fn get_redeemed_code_for(&self, user_id: &str) -> Result<Option<ReferralCode>, StoreError> {
        let query = format!(
            "SELECT {} FROM referral_codes WHERE used_by = $1 AND status = $2",
            CODE_COLUMNS
        );

        let code = sqlx::query_as::<_, ReferralCode>(&query)
            .bind(user_id)
            .bind(ReferralCodeStatus::Used)
            .fetch_optional(&self.pool)
            .await?;

        Ok(code)
    }

    async fn get_earning_by_review(&self, review_id: Uuid) -> Result<Option<ReferralEarning>, StoreError> {
        let query = format!(
            "SELECT {} FROM referral_earnings WHERE review_id = $1",
            EARNING_COLUMNS
        );

        let earning = sqlx::query_as::<_, ReferralEarning>(&query)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(earning)
    }

    async fn record_referral_earning(
        &self,
        earning: ReferralEarning,
    ) -> Result<Option<ReferralEarning>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO referral_earnings (
                id, referrer_id, referred_user_id, referred_user_name, referred_user_email,
                original_amount, commission_amount, review_id, earning_type, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (review_id) DO NOTHING
            RETURNING {}
            "#,
            EARNING_COLUMNS
        );

        let inserted = sqlx::query_as::<_, ReferralEarning>(&query)
            .bind(earning.id)
            .bind(&earning.referrer_id)
            .bind(&earning.referred_user_id)
            .bind(&earning.referred_user_name)
            .bind(&earning.referred_user_email)
            .bind(earning.original_amount)
            .bind(earning.commission_amount)
            .bind(earning.review_id)
            .bind(earning.earning_type)
            .bind(earning.status)
            .bind(earning.created_at)
            .fetch_optional(&mut *tx)
            .await?;

        let inserted = match inserted {
            Some(inserted) => inserted,
            None => return Ok(None),
        };

        sqlx::query(
            r#"
            INSERT INTO referral_stats (referrer_id, total_earned, total_reviews, updated_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (referrer_id) DO UPDATE
            SET total_earned = referral_stats.total_earned + EXCLUDED.total_earned,
                total_reviews = referral_stats.total_reviews + 1,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&inserted.referrer_id)
        .bind(inserted.commission_amount)
        .bind(inserted.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(inserted))
    }

    async fn list_referral_earnings(&self, referrer_id: &str) -> Result<Vec<ReferralEarning>, StoreError> {
        let query = format!(
            "SELECT {} FROM referral_earnings WHERE referrer_id = $1 ORDER BY created_at DESC",
            EARNING_COLUMNS
        );

        let earnings = sqlx::query_as::<_, ReferralEarning>(&query)
            .bind(referrer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(earnings)
    }

    async fn get_referral_stats(&self, referrer_id: &str) -> Result<Option<ReferralStats>, StoreError> {
        let stats = sqlx::query_as::<_, ReferralStats>(
            r#"
            SELECT referrer_id, total_earned, total_reviews, updated_at
            FROM referral_stats WHERE referrer_id = $1
            "#,
        )
        .bind(referrer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Option<ReferralEarning>, StoreError> {
        let query = format!(
            "UPDATE referral_earnings SET status = $2 WHERE id = $1 RETURNING {}",
            EARNING_COLUMNS
        );

        let earning = sqlx::query_as::<_, ReferralEarning>(&query)
            .bind(earning_id)
            .bind(EarningStatus::Paid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(earning)
    }
}
