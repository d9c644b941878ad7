use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsDto {
    #[validate(length(min = 1, max = 100, message = "platformName must be between 1-100 characters"))]
    pub platform_name: Option<String>,

    #[validate(email(message = "supportEmail is invalid"))]
    pub support_email: Option<String>,

    pub notify_reviewers: Option<bool>,
}
