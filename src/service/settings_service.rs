// service/settings_service.rs
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;

use crate::{
    db::{
        cache::{CacheHelper, SETTINGS_CACHE_KEY, SETTINGS_CACHE_TTL},
        settingsdb::SettingsExt,
        StoreHandle,
    },
    dtos::settingsdtos::UpdateSettingsDto,
    models::settingsmodel::AppSettings,
    service::error::ServiceError,
};

pub const LOCAL_SETTINGS_TTL: Duration = Duration::from_secs(60);

struct CachedSettings {
    settings: AppSettings,
    fetched_at: Instant,
}

/// Read-through cache for app settings: process-local slot, then Redis, then the store.
pub struct SettingsService {
    store: StoreHandle,
    redis: Option<Arc<ConnectionManager>>,
    local: RwLock<Option<CachedSettings>>,
    local_ttl: Duration,
}

impl SettingsService {
    pub fn new(store: StoreHandle, redis: Option<Arc<ConnectionManager>>) -> Self {
        Self::with_ttl(store, redis, LOCAL_SETTINGS_TTL)
    }

    pub fn with_ttl(store: StoreHandle, redis: Option<Arc<ConnectionManager>>, local_ttl: Duration) -> Self {
        Self {
            store,
            redis,
            local: RwLock::new(None),
            local_ttl,
        }
    }

    /// Never fails: a store outage falls back to defaults, since nothing
    /// correctness-critical depends on these values.
    pub async fn get(&self) -> AppSettings {
        match self.fetch().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Settings unavailable, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    pub async fn fetch(&self) -> Result<AppSettings, ServiceError> {
        if let Some(cached) = self.local.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.local_ttl {
                return Ok(cached.settings.clone());
            }
        }

        if let Some(redis) = &self.redis {
            match CacheHelper::get::<AppSettings>(redis, SETTINGS_CACHE_KEY).await {
                Ok(Some(settings)) => {
                    self.remember(settings.clone()).await;
                    return Ok(settings);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Redis settings read failed: {}", e),
            }
        }

        let settings = self.store.get_settings().await?.unwrap_or_default();

        if let Some(redis) = &self.redis {
            if let Err(e) = CacheHelper::set(redis, SETTINGS_CACHE_KEY, &settings, SETTINGS_CACHE_TTL).await {
                tracing::warn!("Redis settings write failed: {}", e);
            }
        }

        self.remember(settings.clone()).await;
        Ok(settings)
    }

    pub async fn update(&self, update: UpdateSettingsDto) -> Result<AppSettings, ServiceError> {
        let current = self.store.get_settings().await?.unwrap_or_default();

        let settings = AppSettings {
            platform_name: update.platform_name.unwrap_or(current.platform_name),
            support_email: update.support_email.unwrap_or(current.support_email),
            notify_reviewers: update.notify_reviewers.unwrap_or(current.notify_reviewers),
            updated_at: Utc::now(),
        };

        let saved = self.store.save_settings(settings).await?;
        self.invalidate().await;

        tracing::info!("App settings updated");
        Ok(saved)
    }

    pub async fn invalidate(&self) {
        *self.local.write().await = None;

        if let Some(redis) = &self.redis {
            if let Err(e) = CacheHelper::delete(redis, SETTINGS_CACHE_KEY).await {
                tracing::warn!("Redis settings invalidation failed: {}", e);
            }
        }
    }

    async fn remember(&self, settings: AppSettings) {
        *self.local.write().await = Some(CachedSettings {
            settings,
            fetched_at: Instant::now(),
        });
    }
}
