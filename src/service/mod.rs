pub mod error;
pub mod notification_service;
pub mod payment_webhook;
pub mod payout_service;
pub mod referral_service;
pub mod review_service;
pub mod settings_service;
pub mod storage_service;
pub mod submission_service;
