pub mod cache;
pub mod db;
pub mod memory;
pub mod payoutdb;
pub mod referraldb;
pub mod reviewdb;
pub mod reviewerdb;
pub mod settingsdb;
pub mod submissiondb;

use std::sync::Arc;

use thiserror::Error;

pub use db::DBClient;
pub use memory::InMemoryStore;

use payoutdb::PayoutExt;
use referraldb::ReferralExt;
use reviewdb::ReviewExt;
use reviewerdb::ReviewerExt;
use settingsdb::SettingsExt;
use submissiondb::SubmissionExt;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Maps Postgres unique violations (SQLSTATE 23505) to `Conflict`.
    pub fn from_insert(err: sqlx::Error) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code == "23505")
            .unwrap_or(false);

        if is_unique_violation {
            StoreError::Conflict(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

/// The full document store the pipeline runs against.
pub trait Store:
    SubmissionExt + ReviewExt + PayoutExt + ReferralExt + ReviewerExt + SettingsExt + Send + Sync
{
}

impl<T> Store for T where
    T: SubmissionExt + ReviewExt + PayoutExt + ReferralExt + ReviewerExt + SettingsExt + Send + Sync
{
}

pub type StoreHandle = Arc<dyn Store>;
