// db/settingsdb.rs
use async_trait::async_trait;

use super::{DBClient, StoreError};
use crate::models::settingsmodel::AppSettings;

#[async_trait]
pub trait SettingsExt: Send + Sync {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StoreError>;

    async fn save_settings(&self, settings: AppSettings) -> Result<AppSettings, StoreError>;
}

#[async_trait]
impl SettingsExt for DBClient {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StoreError> {
        let settings = sqlx::query_as::<_, AppSettings>(
            "SELECT platform_name, support_email, notify_reviewers, updated_at FROM app_settings WHERE id",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn save_settings(&self, settings: AppSettings) -> Result<AppSettings, StoreError> {
        let settings = sqlx::query_as::<_, AppSettings>(
            r#"
            INSERT INTO app_settings (id, platform_name, support_email, notify_reviewers, updated_at)
            VALUES (TRUE, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET platform_name = EXCLUDED.platform_name,
                support_email = EXCLUDED.support_email,
                notify_reviewers = EXCLUDED.notify_reviewers,
                updated_at = EXCLUDED.updated_at
            RETURNING platform_name, support_email, notify_reviewers, updated_at
            "#,
        )
        .bind(&settings.platform_name)
        .bind(&settings.support_email)
        .bind(settings.notify_reviewers)
        .bind(settings.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
