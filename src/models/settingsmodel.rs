use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rarely-changing presentation settings. Nothing correctness-critical reads these.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub platform_name: String,
    pub support_email: String,
    pub notify_reviewers: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            platform_name: "Review Desk".to_string(),
            support_email: "support@reviewdesk.app".to_string(),
            notify_reviewers: true,
            updated_at: DateTime::<Utc>::default(),
        }
    }
}
