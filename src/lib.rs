pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use redis::aio::ConnectionManager;

use config::Config;
use db::StoreHandle;
use service::{
    notification_service::{NotificationService, Notifier},
    payment_webhook::WebhookService,
    payout_service::PayoutService,
    referral_service::ReferralService,
    review_service::ReviewService,
    settings_service::SettingsService,
    storage_service::AudioStorage,
    submission_service::SubmissionService,
};

pub struct AppState {
    pub env: Config,
    pub store: StoreHandle,
    pub settings: Arc<SettingsService>,
    pub notifications: Arc<NotificationService>,
    pub webhooks: WebhookService,
    pub submissions: SubmissionService,
    pub reviews: ReviewService,
    pub payouts: PayoutService,
    pub referrals: ReferralService,
    pub storage: Arc<dyn AudioStorage>,
}

impl AppState {
    pub fn new(
        env: Config,
        store: StoreHandle,
        redis: Option<Arc<ConnectionManager>>,
        notifier: Arc<dyn Notifier>,
        storage: Arc<dyn AudioStorage>,
    ) -> Self {
        let settings = Arc::new(SettingsService::new(store.clone(), redis));
        let notifications = Arc::new(NotificationService::new(notifier, store.clone(), settings.clone()));

        AppState {
            webhooks: WebhookService::new(
                store.clone(),
                notifications.clone(),
                env.checkout_webhook_secret.clone(),
                env.webhook_tolerance_secs,
            ),
            submissions: SubmissionService::new(store.clone(), env.app_url.clone()),
            reviews: ReviewService::new(store.clone(), notifications.clone(), env.app_url.clone()),
            payouts: PayoutService::new(store.clone()),
            referrals: ReferralService::new(store.clone()),
            settings,
            notifications,
            storage,
            store,
            env,
        }
    }
}
