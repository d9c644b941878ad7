pub mod payouts;
pub mod referrals;
pub mod reviewers;
pub mod reviews;
pub mod settings;
pub mod submissions;
pub mod uploads;
pub mod webhook;
