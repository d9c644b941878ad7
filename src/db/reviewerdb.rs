// db/reviewerdb.rs
use async_trait::async_trait;

use super::{DBClient, StoreError};
use crate::models::reviewermodel::ReviewerProfile;

#[async_trait]
pub trait ReviewerExt: Send + Sync {
    async fn upsert_reviewer(&self, profile: ReviewerProfile) -> Result<ReviewerProfile, StoreError>;

    async fn get_reviewer(&self, reviewer_id: &str) -> Result<Option<ReviewerProfile>, StoreError>;
}

#[async_trait]
impl ReviewerExt for DBClient {
    async fn upsert_reviewer(&self, profile: ReviewerProfile) -> Result<ReviewerProfile, StoreError> {
        let profile = sqlx::query_as::<_, ReviewerProfile>(
            r#"
            INSERT INTO reviewers (id, name, email, avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = EXCLUDED.updated_at
            RETURNING id, name, email, avatar_url, created_at, updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.avatar_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn get_reviewer(&self, reviewer_id: &str) -> Result<Option<ReviewerProfile>, StoreError> {
        let profile = sqlx::query_as::<_, ReviewerProfile>(
            "SELECT id, name, email, avatar_url, created_at, updated_at FROM reviewers WHERE id = $1",
        )
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
