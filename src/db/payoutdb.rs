// db/payoutdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DBClient, StoreError};
use crate::models::payoutmodel::{Payout, PayoutStatus};

const PAYOUT_COLUMNS: &str = r#"
    id, reviewer_id, reviewer, amount, amount_in_cents, payment_method,
    reviews, status, date, paid_date
"#;

#[async_trait]
pub trait PayoutExt: Send + Sync {
    async fn insert_payout(&self, payout: Payout) -> Result<Payout, StoreError>;

    async fn get_payout(&self, payout_id: Uuid) -> Result<Option<Payout>, StoreError>;

    /// Pending -> Paid. `None` when the payout was not Pending (already paid or absent).
    async fn mark_payout_paid(
        &self,
        payout_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payout>, StoreError>;

    async fn list_payouts(
        &self,
        reviewer_id: Option<&str>,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<Payout>, StoreError>;

    /// Review ids already referenced by any payout of this reviewer.
    async fn paid_out_review_ids(&self, reviewer_id: &str) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl PayoutExt for DBClient {
    async fn insert_payout(&self, payout: Payout) -> Result<Payout, StoreError> {
        let query = format!(
            r#"
            INSERT INTO payouts (
                id, reviewer_id, reviewer, amount, amount_in_cents, payment_method,
                reviews, status, date, paid_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            PAYOUT_COLUMNS
        );

        let payout = sqlx::query_as::<_, Payout>(&query)
            .bind(payout.id)
            .bind(&payout.reviewer_id)
            .bind(&payout.reviewer)
            .bind(&payout.amount)
            .bind(payout.amount_in_cents)
            .bind(&payout.payment_method)
            .bind(&payout.reviews)
            .bind(payout.status)
            .bind(payout.date)
            .bind(payout.paid_date)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_insert)?;

        Ok(payout)
    }

    async fn get_payout(&self, payout_id: Uuid) -> Result<Option<Payout>, StoreError> {
        let query = format!("SELECT {} FROM payouts WHERE id = $1", PAYOUT_COLUMNS);

        let payout = sqlx::query_as::<_, Payout>(&query)
            .bind(payout_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payout)
    }

    async fn mark_payout_paid(
        &self,
        payout_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payout>, StoreError> {
        let query = format!(
            r#"
            UPDATE payouts SET status = $2, paid_date = $3
            WHERE id = $1 AND status = $4
            RETURNING {}
            "#,
            PAYOUT_COLUMNS
        );

        let payout = sqlx::query_as::<_, Payout>(&query)
            .bind(payout_id)
            .bind(PayoutStatus::Paid)
            .bind(paid_at)
            .bind(PayoutStatus::Pending)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payout)
    }

    async fn list_payouts(
        &self,
        reviewer_id: Option<&str>,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<Payout>, StoreError> {
        let query = format!(
            r#"
            SELECT {} FROM payouts
            WHERE ($1::TEXT IS NULL OR reviewer_id = $1)
              AND ($2::payout_status IS NULL OR status = $2)
            ORDER BY date DESC
            "#,
            PAYOUT_COLUMNS
        );

        let payouts = sqlx::query_as::<_, Payout>(&query)
            .bind(reviewer_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(payouts)
    }

    async fn paid_out_review_ids(&self, reviewer_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT item->>'id'
            FROM payouts, jsonb_array_elements(reviews) AS item
            WHERE reviewer_id = $1
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
