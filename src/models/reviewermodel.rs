use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payoutmodel::ReviewerSnapshot;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewerProfile {
    pub fn snapshot(&self) -> ReviewerSnapshot {
        ReviewerSnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar_url.clone(),
        }
    }
}
